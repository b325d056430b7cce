//! Per-column drop handling: live reordering while hovering, move intents on drop.

use tracing::{debug, warn};

use crate::{
    domain::{insertion_anchor, position_of, Anchor, DragSession, MoveIntent, Status, TaskId},
    error::{BoardError, Result},
    view::BoardView,
};

/// Drop handling for one column
#[derive(Debug, Clone)]
pub struct DropzoneController {
    status: Status,
    active: bool,
}

impl DropzoneController {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            active: false,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Whether the zone is currently marked as the active drop target
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handles a drag-over at `pointer_y`.
    ///
    /// Marks the zone as the active target and splices the dragged card
    /// into the computed position right away, before anything reaches the
    /// server. Returns the anchor used, or `None` when no card is in flight.
    pub fn on_drag_over<V: BoardView>(
        &mut self,
        session: &DragSession,
        pointer_y: f64,
        view: &mut V,
    ) -> Result<Option<Anchor>> {
        self.set_active(view, true);

        let Some(dragged) = session.dragged() else {
            return Ok(None);
        };

        let cards = view.cards_in(&self.status)?;
        let anchor = insertion_anchor(&cards, pointer_y, Some(dragged));

        let order: Vec<TaskId> = cards.iter().map(|c| c.id).collect();
        if !already_placed(&order, dragged, anchor) {
            view.move_card(dragged, &self.status, anchor)?;
            debug!(card = %dragged, zone = %self.status, ?anchor, "reordered dragged card");
        }
        Ok(Some(anchor))
    }

    /// Handles the pointer leaving the zone. Any reordering already done stays.
    pub fn on_drag_leave<V: BoardView>(&mut self, view: &mut V) {
        self.set_active(view, false);
    }

    /// Handles a drop on this zone.
    ///
    /// The position is read from the zone's current order, i.e. after the
    /// optimistic splices, so it is 1 plus the number of other cards
    /// preceding the dropped one. Returns `None` when nothing was being
    /// dragged (a file from the desktop, for instance).
    pub fn on_drop<V: BoardView>(
        &mut self,
        session: &DragSession,
        view: &mut V,
    ) -> Result<Option<MoveIntent>> {
        self.set_active(view, false);

        let Some(dragged) = session.dragged() else {
            debug!(zone = %self.status, "drop without an active drag ignored");
            return Ok(None);
        };

        let mut order = view.order_of(&self.status)?;
        if !order.contains(&dragged) {
            warn!(
                card = %dragged,
                zone = %self.status,
                "dropped card missing from zone, appending"
            );
            view.move_card(dragged, &self.status, Anchor::End)?;
            order = view.order_of(&self.status)?;
        }

        let position = position_of(&order, dragged)
            .ok_or_else(|| BoardError::CardNotFound(dragged.to_string()))?;
        Ok(Some(MoveIntent::new(dragged, self.status.clone(), position)))
    }

    fn set_active<V: BoardView>(&mut self, view: &mut V, active: bool) {
        self.active = active;
        view.set_drop_target(&self.status, active);
    }
}

/// Whether `card` already sits where `anchor` would put it
fn already_placed(order: &[TaskId], card: TaskId, anchor: Anchor) -> bool {
    let Some(idx) = order.iter().position(|id| *id == card) else {
        return false;
    };
    match (order.get(idx + 1), anchor) {
        (Some(next), Anchor::Before(before)) => *next == before,
        (None, Anchor::End) => true,
        _ => false,
    }
}
