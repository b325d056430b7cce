use crate::domain::card::TaskId;

/// The single in-flight drag gesture, if any.
///
/// `Idle -> Dragging -> Idle`. The browser only runs one drag gesture at a
/// time, so starting a new drag while one is active just replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        card: TaskId,
        /// Whether the card has received the "dragging" visual mark yet
        marked: bool,
    },
}

impl DragSession {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Enters `Dragging` for `card`. Returns the card of a session that was
    /// still open, which only happens if a drag-end was never delivered.
    pub fn start(&mut self, card: TaskId) -> Option<TaskId> {
        let previous = self.dragged();
        *self = Self::Dragging {
            card,
            marked: false,
        };
        previous
    }

    /// Records that the deferred visual mark is being applied to `card`.
    ///
    /// Returns `false` when the gesture already ended (or moved on to a
    /// different card) before the tick fired, in which case the caller
    /// must not mark anything.
    pub fn mark(&mut self, card: TaskId) -> bool {
        match self {
            Self::Dragging {
                card: current,
                marked,
            } if *current == card => {
                *marked = true;
                true
            }
            _ => false,
        }
    }

    /// Returns to `Idle`, yielding the card that was being dragged.
    pub fn end(&mut self) -> Option<TaskId> {
        std::mem::take(self).dragged()
    }

    pub fn dragged(&self) -> Option<TaskId> {
        match self {
            Self::Idle => None,
            Self::Dragging { card, .. } => Some(*card),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_marked(&self) -> bool {
        matches!(self, Self::Dragging { marked: true, .. })
    }
}
