//! Rendering surfaces the engine drives.
//!
//! The drag engine never touches a document directly. It talks to a
//! [`BoardView`] (cards, columns, visual marks), registers handlers through
//! [`Bindable`], and reports to the user through a [`PageShell`]. The
//! browser implementation lives in `crate::web`; [`memory`] is a headless
//! one for tests and non-browser hosts.

use crate::{
    domain::{Anchor, CardBox, Status, TaskId},
    error::Result,
};

pub mod memory;

/// The board as laid out on screen
pub trait BoardView {
    /// Lists every card on the page in document order
    fn card_ids(&self) -> Vec<TaskId>;

    /// Lists the status label of every dropzone in document order
    fn zone_statuses(&self) -> Vec<Status>;

    /// Returns the cards inside `zone` in document order, with geometry
    fn cards_in(&self, zone: &Status) -> Result<Vec<CardBox>>;

    /// Moves the card's node into `zone` at `anchor`
    fn move_card(&mut self, card: TaskId, zone: &Status, anchor: Anchor) -> Result<()>;

    /// Adds or removes the "being dragged" mark on a card
    fn set_dragging(&mut self, card: TaskId, dragging: bool);

    /// Adds or removes the "active drop target" mark on a dropzone
    fn set_drop_target(&mut self, zone: &Status, active: bool);

    /// Returns the ids of the cards in `zone`, in document order
    fn order_of(&self, zone: &Status) -> Result<Vec<TaskId>> {
        Ok(self.cards_in(zone)?.into_iter().map(|c| c.id).collect())
    }
}

/// A board whose nodes can carry event handlers.
///
/// Handlers belong to nodes, not to ids: a node that is replaced by a
/// re-render comes back without handlers and must be bound again.
pub trait Bindable: BoardView {
    /// Attaches drag-start/drag-end handlers to the card's node.
    /// Returns `false` when the node already has them.
    fn bind_card(&mut self, card: TaskId) -> Result<bool>;

    /// Attaches drag-over/drag-leave/drop handlers to the dropzone's node.
    /// Returns `false` when the node already has them.
    fn bind_zone(&mut self, zone: &Status) -> Result<bool>;
}

/// Page-level effects outside the board itself
pub trait PageShell {
    /// Shows a blocking notification
    fn alert(&self, message: &str);

    /// Asks a blocking yes/no question
    fn confirm(&self, message: &str) -> bool;

    /// Reloads the whole page, resynchronizing every card with the server
    fn reload(&self);

    /// Whether a reload has been requested; the current page is about to go away
    fn is_reloading(&self) -> bool;

    /// Replaces the detail view's content with a server-rendered fragment
    fn set_detail_html(&self, html: &str);

    /// Binds the close buttons inside the detail view, returning how many were bound
    fn bind_detail_close_buttons(&self) -> usize;

    /// Shows the detail view
    fn open_detail(&self);

    /// Hides the detail view
    fn close_detail(&self);
}
