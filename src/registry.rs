use tracing::debug;

use crate::{
    domain::{Status, TaskId},
    error::Result,
    view::Bindable,
};

/// Nodes that received handlers in one wiring pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wiring {
    pub cards: Vec<TaskId>,
    pub zones: Vec<Status>,
}

impl Wiring {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.zones.is_empty()
    }
}

/// Enumerates cards and dropzones and makes sure each node has handlers.
///
/// Run once at startup and again whenever cards are re-rendered without a
/// full page load. Nodes that are already bound are skipped, so wiring
/// twice never doubles a handler.
#[derive(Debug, Default)]
pub struct CardRegistry {
    passes: u32,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every unbound card and dropzone on the board
    pub fn wire<V: Bindable>(&mut self, view: &mut V) -> Result<Wiring> {
        self.passes += 1;
        let mut wiring = Wiring::default();

        for card in view.card_ids() {
            if view.bind_card(card)? {
                wiring.cards.push(card);
            }
        }
        for zone in view.zone_statuses() {
            if view.bind_zone(&zone)? {
                wiring.zones.push(zone);
            }
        }

        debug!(
            pass = self.passes,
            cards = wiring.cards.len(),
            zones = wiring.zones.len(),
            "wired board handlers"
        );
        Ok(wiring)
    }

    /// Number of wiring passes run so far
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::memory::MemoryBoard;

    #[test]
    fn test_initial_wiring_binds_everything() {
        let mut board =
            MemoryBoard::from_columns([("todo", vec![1, 2]), ("done", vec![3])]).unwrap();
        let mut registry = CardRegistry::new();

        let wiring = registry.wire(&mut board).unwrap();

        assert_eq!(
            wiring.cards,
            vec![TaskId::new(1), TaskId::new(2), TaskId::new(3)]
        );
        assert_eq!(wiring.zones.len(), 2);
        assert!(board.is_card_bound(TaskId::new(3)));
        assert!(board.is_zone_bound("done"));
    }

    #[test]
    fn test_rewiring_skips_bound_nodes() {
        let mut board = MemoryBoard::from_columns([("todo", vec![1, 2])]).unwrap();
        let mut registry = CardRegistry::new();

        registry.wire(&mut board).unwrap();
        let second = registry.wire(&mut board).unwrap();

        assert!(second.is_empty());
        assert_eq!(registry.passes(), 2);
    }

    #[test]
    fn test_rewiring_after_rerender_binds_new_nodes() {
        let mut board = MemoryBoard::from_columns([("todo", vec![1, 2])]).unwrap();
        let mut registry = CardRegistry::new();
        registry.wire(&mut board).unwrap();

        board.rerender();
        let wiring = registry.wire(&mut board).unwrap();

        assert_eq!(wiring.cards, vec![TaskId::new(1), TaskId::new(2)]);
        assert_eq!(wiring.zones, vec![Status::new("todo").unwrap()]);
    }

    #[test]
    fn test_new_cards_get_bound_on_next_pass() {
        let mut board = MemoryBoard::from_columns([("todo", vec![1])]).unwrap();
        let mut registry = CardRegistry::new();
        registry.wire(&mut board).unwrap();

        board
            .add_column(Status::new("done").unwrap(), [TaskId::new(9)])
            .unwrap();
        let wiring = registry.wire(&mut board).unwrap();

        assert_eq!(wiring.cards, vec![TaskId::new(9)]);
        assert_eq!(wiring.zones, vec![Status::new("done").unwrap()]);
    }
}
