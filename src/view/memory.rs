use std::{
    cell::{Cell, RefCell},
    collections::{HashSet, VecDeque},
};

use tracing::trace;

use crate::{
    domain::{placement::splice, Anchor, CardBox, CardRect, Status, TaskId},
    error::{BoardError, Result},
    view::{Bindable, BoardView, PageShell},
};

/// Default rendered height of a card
const CARD_HEIGHT: f64 = 40.0;

#[derive(Debug, Clone)]
struct MemoryColumn {
    status: Status,
    cards: Vec<TaskId>,
}

/// Headless board: columns of cards stacked top to bottom.
///
/// Geometry is derived from order, so moving a card shifts every card
/// below it exactly as a browser layout would.
#[derive(Debug, Clone)]
pub struct MemoryBoard {
    columns: Vec<MemoryColumn>,
    card_height: f64,
    card_gap: f64,
    dragging: HashSet<TaskId>,
    drop_targets: HashSet<Status>,
    bound_cards: HashSet<TaskId>,
    bound_zones: HashSet<Status>,
}

impl MemoryBoard {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            card_height: CARD_HEIGHT,
            card_gap: 0.0,
            dragging: HashSet::new(),
            drop_targets: HashSet::new(),
            bound_cards: HashSet::new(),
            bound_zones: HashSet::new(),
        }
    }

    /// Builds a board from `(status, card ids)` pairs in column order
    pub fn from_columns<S, I>(columns: impl IntoIterator<Item = (S, I)>) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = u64>,
    {
        let mut board = Self::new();
        for (status, cards) in columns {
            let status = Status::new(status.as_ref())?;
            board.add_column(status, cards.into_iter().map(TaskId::new))?;
        }
        Ok(board)
    }

    pub fn with_card_gap(mut self, gap: f64) -> Self {
        self.card_gap = gap;
        self
    }

    pub fn add_column(
        &mut self,
        status: Status,
        cards: impl IntoIterator<Item = TaskId>,
    ) -> Result<()> {
        if self.column(&status).is_some() {
            return Err(BoardError::InvalidStatus(format!(
                "duplicate column {status}"
            )));
        }
        let cards: Vec<TaskId> = cards.into_iter().collect();
        for card in &cards {
            if self.column_of(*card).is_some() {
                return Err(BoardError::InvalidTaskId(format!("duplicate card {card}")));
            }
        }
        self.columns.push(MemoryColumn { status, cards });
        Ok(())
    }

    /// Simulates a page reload: every node is replaced, so all handler
    /// bindings and visual marks are lost while the order stays.
    pub fn rerender(&mut self) {
        self.bound_cards.clear();
        self.bound_zones.clear();
        self.dragging.clear();
        self.drop_targets.clear();
    }

    /// Returns the status of the column holding `card`
    pub fn column_of(&self, card: TaskId) -> Option<&Status> {
        self.columns
            .iter()
            .find(|col| col.cards.contains(&card))
            .map(|col| &col.status)
    }

    /// Returns the ids in `zone` as plain integers, handy for assertions
    pub fn ids_in(&self, zone: &str) -> Vec<u64> {
        self.columns
            .iter()
            .find(|col| col.status.as_str() == zone)
            .map(|col| col.cards.iter().map(|id| id.get()).collect())
            .unwrap_or_default()
    }

    /// Returns the vertical box of a card under the current layout
    pub fn rect_of(&self, card: TaskId) -> Option<CardRect> {
        self.columns.iter().find_map(|col| {
            col.cards
                .iter()
                .position(|id| *id == card)
                .map(|idx| self.rect_at(idx))
        })
    }

    pub fn is_dragging(&self, card: TaskId) -> bool {
        self.dragging.contains(&card)
    }

    pub fn is_drop_target(&self, zone: &str) -> bool {
        self.drop_targets.iter().any(|s| s.as_str() == zone)
    }

    pub fn is_card_bound(&self, card: TaskId) -> bool {
        self.bound_cards.contains(&card)
    }

    pub fn is_zone_bound(&self, zone: &str) -> bool {
        self.bound_zones.iter().any(|s| s.as_str() == zone)
    }

    fn column(&self, zone: &Status) -> Option<&MemoryColumn> {
        self.columns.iter().find(|col| &col.status == zone)
    }

    fn rect_at(&self, idx: usize) -> CardRect {
        CardRect::new(idx as f64 * (self.card_height + self.card_gap), self.card_height)
    }
}

impl Default for MemoryBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardView for MemoryBoard {
    fn card_ids(&self) -> Vec<TaskId> {
        self.columns
            .iter()
            .flat_map(|col| col.cards.iter().copied())
            .collect()
    }

    fn zone_statuses(&self) -> Vec<Status> {
        self.columns.iter().map(|col| col.status.clone()).collect()
    }

    fn cards_in(&self, zone: &Status) -> Result<Vec<CardBox>> {
        let column = self
            .column(zone)
            .ok_or_else(|| BoardError::DropzoneNotFound(zone.to_string()))?;
        Ok(column
            .cards
            .iter()
            .enumerate()
            .map(|(idx, id)| CardBox::new(*id, self.rect_at(idx)))
            .collect())
    }

    fn move_card(&mut self, card: TaskId, zone: &Status, anchor: Anchor) -> Result<()> {
        if self.column(zone).is_none() {
            return Err(BoardError::DropzoneNotFound(zone.to_string()));
        }
        let source = self
            .columns
            .iter_mut()
            .find(|col| col.cards.contains(&card))
            .ok_or_else(|| BoardError::CardNotFound(card.to_string()))?;
        source.cards.retain(|id| *id != card);

        if let Some(target) = self.columns.iter_mut().find(|col| &col.status == zone) {
            splice(&mut target.cards, card, anchor);
        }
        trace!(%card, %zone, ?anchor, "memory board moved card");
        Ok(())
    }

    fn set_dragging(&mut self, card: TaskId, dragging: bool) {
        if dragging {
            self.dragging.insert(card);
        } else {
            self.dragging.remove(&card);
        }
    }

    fn set_drop_target(&mut self, zone: &Status, active: bool) {
        if active {
            self.drop_targets.insert(zone.clone());
        } else {
            self.drop_targets.remove(zone);
        }
    }
}

impl Bindable for MemoryBoard {
    fn bind_card(&mut self, card: TaskId) -> Result<bool> {
        if self.column_of(card).is_none() {
            return Err(BoardError::CardNotFound(card.to_string()));
        }
        Ok(self.bound_cards.insert(card))
    }

    fn bind_zone(&mut self, zone: &Status) -> Result<bool> {
        if self.column(zone).is_none() {
            return Err(BoardError::DropzoneNotFound(zone.to_string()));
        }
        Ok(self.bound_zones.insert(zone.clone()))
    }
}

/// Headless page shell that records every effect.
///
/// `confirm` answers come from a queue and default to `true` once the
/// queue is empty.
#[derive(Debug, Default)]
pub struct MemoryPage {
    alerts: RefCell<Vec<String>>,
    confirmations: RefCell<Vec<String>>,
    confirm_answers: RefCell<VecDeque<bool>>,
    reloads: Cell<usize>,
    detail_html: RefCell<Option<String>>,
    detail_open: Cell<bool>,
    close_buttons_bound: Cell<usize>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer for the next `confirm`
    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answers.borrow_mut().push_back(answer);
    }

    /// Marks the detail view as open with the given content
    pub fn show_detail(&self, html: &str) {
        *self.detail_html.borrow_mut() = Some(html.to_string());
        self.detail_open.set(true);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.borrow().clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }

    pub fn detail_html(&self) -> Option<String> {
        self.detail_html.borrow().clone()
    }

    pub fn is_detail_open(&self) -> bool {
        self.detail_open.get()
    }

    /// Total close buttons bound across every detail refresh
    pub fn close_buttons_bound(&self) -> usize {
        self.close_buttons_bound.get()
    }
}

impl PageShell for MemoryPage {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations.borrow_mut().push(message.to_string());
        self.confirm_answers.borrow_mut().pop_front().unwrap_or(true)
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn is_reloading(&self) -> bool {
        self.reloads.get() > 0
    }

    fn set_detail_html(&self, html: &str) {
        *self.detail_html.borrow_mut() = Some(html.to_string());
    }

    fn bind_detail_close_buttons(&self) -> usize {
        let count = self
            .detail_html
            .borrow()
            .as_deref()
            .map_or(0, |html| html.matches("data-close").count());
        self.close_buttons_bound
            .set(self.close_buttons_bound.get() + count);
        count
    }

    fn open_detail(&self) {
        self.detail_open.set(true);
    }

    fn close_detail(&self) {
        self.detail_open.set(false);
    }
}
