use tracing::{debug, warn};

use crate::{
    domain::{Anchor, DragSession, MoveIntent, Status, TaskId},
    dropzone::DropzoneController,
    error::{BoardError, Result},
    registry::{CardRegistry, Wiring},
    view::{Bindable, BoardView},
};

/// Owns the drag state of one board and routes gesture events to it.
///
/// The controller holds the only [`DragSession`] and one
/// [`DropzoneController`] per column; event handlers borrow it for the
/// duration of a single event.
#[derive(Debug, Default)]
pub struct BoardController {
    session: DragSession,
    zones: Vec<DropzoneController>,
    registry: CardRegistry,
}

impl BoardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn zones(&self) -> &[DropzoneController] {
        &self.zones
    }

    /// Binds handlers to any new card or dropzone nodes
    pub fn wire<V: Bindable>(&mut self, view: &mut V) -> Result<Wiring> {
        let wiring = self.registry.wire(view)?;
        for status in &wiring.zones {
            if self.zone_index(status).is_none() {
                self.zones.push(DropzoneController::new(status.clone()));
            }
        }
        Ok(wiring)
    }

    /// Starts a drag of `card`. The visual mark is applied later by
    /// [`Self::drag_marker_tick`] so the drag image keeps the unmarked look.
    pub fn drag_start<V: BoardView>(&mut self, card: TaskId, view: &mut V) {
        if let Some(stale) = self.session.start(card) {
            warn!(%stale, %card, "drag started while another was active");
            view.set_dragging(stale, false);
        }
        debug!(%card, "drag started");
    }

    /// Applies the deferred "dragging" mark, unless the gesture is already over
    pub fn drag_marker_tick<V: BoardView>(&mut self, card: TaskId, view: &mut V) -> bool {
        let marked = self.session.mark(card);
        if marked {
            view.set_dragging(card, true);
        }
        marked
    }

    /// Ends the gesture, dropped or cancelled, and returns to idle
    pub fn drag_end<V: BoardView>(&mut self, view: &mut V) -> Option<TaskId> {
        let card = self.session.end()?;
        view.set_dragging(card, false);
        debug!(%card, "drag ended");
        Some(card)
    }

    pub fn drag_over<V: BoardView>(
        &mut self,
        zone: &Status,
        pointer_y: f64,
        view: &mut V,
    ) -> Result<Option<Anchor>> {
        let idx = self.require_zone(zone)?;
        self.zones[idx].on_drag_over(&self.session, pointer_y, view)
    }

    pub fn drag_leave<V: BoardView>(&mut self, zone: &Status, view: &mut V) -> Result<()> {
        let idx = self.require_zone(zone)?;
        self.zones[idx].on_drag_leave(view);
        Ok(())
    }

    /// Handles a drop on `zone`, returning the move to persist.
    ///
    /// The session stays open; the gesture's drag-end closes it.
    pub fn drop<V: BoardView>(&mut self, zone: &Status, view: &mut V) -> Result<Option<MoveIntent>> {
        let idx = self.require_zone(zone)?;
        self.zones[idx].on_drop(&self.session, view)
    }

    fn zone_index(&self, zone: &Status) -> Option<usize> {
        self.zones.iter().position(|z| z.status() == zone)
    }

    fn require_zone(&self, zone: &Status) -> Result<usize> {
        self.zone_index(zone)
            .ok_or_else(|| BoardError::DropzoneNotFound(zone.to_string()))
    }
}
