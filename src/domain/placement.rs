use crate::domain::card::TaskId;

/// Vertical extent of a card in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub top: f64,
    pub height: f64,
}

impl CardRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// A card as seen by the layout: its id and where it currently sits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardBox {
    pub id: TaskId,
    pub rect: CardRect,
}

impl CardBox {
    pub fn new(id: TaskId, rect: CardRect) -> Self {
        Self { id, rect }
    }
}

/// Where the dragged card should be spliced into a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Insert immediately before this card
    Before(TaskId),
    /// Append after every card in the column
    End,
}

/// Finds the insertion point for a drag hovering at `pointer_y`.
///
/// `cards` is the column in document order. The dragged card is skipped
/// even if present, so it can never anchor against itself. The winner is
/// the card whose vertical midpoint is the nearest one below the pointer;
/// on equal distances the earlier card wins. When the pointer is below
/// every midpoint (or the column is empty) the result is [`Anchor::End`].
///
/// # Examples
/// ```
/// use taskboard_client::domain::card::TaskId;
/// use taskboard_client::domain::placement::{insertion_anchor, Anchor, CardBox, CardRect};
///
/// let cards = vec![
///     CardBox::new(TaskId::new(1), CardRect::new(0.0, 40.0)),
///     CardBox::new(TaskId::new(2), CardRect::new(40.0, 40.0)),
/// ];
///
/// assert_eq!(insertion_anchor(&cards, 30.0, None), Anchor::Before(TaskId::new(2)));
/// assert_eq!(insertion_anchor(&cards, 75.0, None), Anchor::End);
/// ```
pub fn insertion_anchor(cards: &[CardBox], pointer_y: f64, dragged: Option<TaskId>) -> Anchor {
    let mut closest: Option<(f64, TaskId)> = None;

    for card in cards.iter().filter(|c| Some(c.id) != dragged) {
        let offset = pointer_y - card.rect.midpoint();
        if offset >= 0.0 {
            continue;
        }
        match closest {
            Some((best, _)) if offset <= best => {}
            _ => closest = Some((offset, card.id)),
        }
    }

    closest.map_or(Anchor::End, |(_, id)| Anchor::Before(id))
}

/// 1-based position of `card` in `order`, or `None` if it is not there
pub fn position_of(order: &[TaskId], card: TaskId) -> Option<u32> {
    order
        .iter()
        .position(|id| *id == card)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

/// Splices `card` into `order` at `anchor`, removing any earlier
/// occurrence first. An anchor that is not in `order` appends.
pub fn splice(order: &mut Vec<TaskId>, card: TaskId, anchor: Anchor) {
    order.retain(|id| *id != card);
    let idx = match anchor {
        Anchor::Before(before) => order
            .iter()
            .position(|id| *id == before)
            .unwrap_or(order.len()),
        Anchor::End => order.len(),
    };
    order.insert(idx, card);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(ids: &[u64], height: f64) -> Vec<CardBox> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                CardBox::new(TaskId::new(*id), CardRect::new(i as f64 * height, height))
            })
            .collect()
    }

    #[test]
    fn test_empty_column_is_end() {
        assert_eq!(insertion_anchor(&[], 10.0, None), Anchor::End);
        assert_eq!(insertion_anchor(&[], -10.0, Some(TaskId::new(1))), Anchor::End);
    }

    #[test]
    fn test_pointer_above_everything_anchors_first_card() {
        let cards = column(&[1, 2, 3], 40.0);
        assert_eq!(insertion_anchor(&cards, -5.0, None), Anchor::Before(TaskId::new(1)));
        assert_eq!(insertion_anchor(&cards, 19.0, None), Anchor::Before(TaskId::new(1)));
    }

    #[test]
    fn test_picks_nearest_midpoint_below_pointer() {
        // midpoints: 20, 60, 100
        let cards = column(&[1, 2, 3], 40.0);

        assert_eq!(insertion_anchor(&cards, 21.0, None), Anchor::Before(TaskId::new(2)));
        assert_eq!(insertion_anchor(&cards, 59.0, None), Anchor::Before(TaskId::new(2)));
        assert_eq!(insertion_anchor(&cards, 61.0, None), Anchor::Before(TaskId::new(3)));
    }

    #[test]
    fn test_pointer_on_or_below_last_midpoint_is_end() {
        let cards = column(&[1, 2, 3], 40.0);

        // exactly on a midpoint is not "above" it
        assert_eq!(insertion_anchor(&cards, 100.0, None), Anchor::End);
        assert_eq!(insertion_anchor(&cards, 500.0, None), Anchor::End);
    }

    #[test]
    fn test_dragged_card_never_anchors() {
        let cards = column(&[1, 2, 3], 40.0);

        // pointer just above card 2's midpoint, but card 2 is the one in flight
        let anchor = insertion_anchor(&cards, 50.0, Some(TaskId::new(2)));
        assert_eq!(anchor, Anchor::Before(TaskId::new(3)));

        let only_self = column(&[9], 40.0);
        assert_eq!(insertion_anchor(&only_self, 0.0, Some(TaskId::new(9))), Anchor::End);
    }

    #[test]
    fn test_equal_offsets_prefer_document_order() {
        let cards = vec![
            CardBox::new(TaskId::new(1), CardRect::new(50.0, 20.0)),
            CardBox::new(TaskId::new(2), CardRect::new(50.0, 20.0)),
        ];
        assert_eq!(insertion_anchor(&cards, 0.0, None), Anchor::Before(TaskId::new(1)));
    }

    #[test]
    fn test_scan_does_not_assume_sorted_geometry() {
        let cards = vec![
            CardBox::new(TaskId::new(1), CardRect::new(200.0, 40.0)),
            CardBox::new(TaskId::new(2), CardRect::new(40.0, 40.0)),
        ];
        assert_eq!(insertion_anchor(&cards, 30.0, None), Anchor::Before(TaskId::new(2)));
    }

    #[test]
    fn test_position_of_is_one_based() {
        let order = vec![TaskId::new(4), TaskId::new(5), TaskId::new(6)];

        assert_eq!(position_of(&order, TaskId::new(4)), Some(1));
        assert_eq!(position_of(&order, TaskId::new(6)), Some(3));
        assert_eq!(position_of(&order, TaskId::new(7)), None);
    }

    #[test]
    fn test_splice_moves_within_column() {
        let mut order = vec![TaskId::new(1), TaskId::new(2), TaskId::new(3)];

        splice(&mut order, TaskId::new(3), Anchor::Before(TaskId::new(2)));
        assert_eq!(order, vec![TaskId::new(1), TaskId::new(3), TaskId::new(2)]);

        splice(&mut order, TaskId::new(1), Anchor::End);
        assert_eq!(order, vec![TaskId::new(3), TaskId::new(2), TaskId::new(1)]);
    }

    #[test]
    fn test_splice_with_unknown_anchor_appends() {
        let mut order = vec![TaskId::new(1)];
        splice(&mut order, TaskId::new(2), Anchor::Before(TaskId::new(99)));
        assert_eq!(order, vec![TaskId::new(1), TaskId::new(2)]);
    }
}
