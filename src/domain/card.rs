use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::BoardError;

/// Identifier of a task, unique within the board (e.g. the `7` in
/// `data-task-id="7"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for TaskId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| BoardError::InvalidTaskId(s.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status label of a column ("todo", "inprogress", "done", ...).
///
/// The set of valid labels belongs to the server, so the label is kept
/// opaque here. The only local rule is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(String);

impl Status {
    pub fn new(label: impl Into<String>) -> Result<Self, BoardError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(BoardError::InvalidStatus(label));
        }
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Status {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A committed move, built at drop time and sent as the body of
/// `POST /update_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub task_id: TaskId,
    pub new_status: Status,
    /// 1-based position among the cards of `new_status`
    pub new_position: u32,
}

impl MoveIntent {
    pub fn new(task_id: TaskId, new_status: Status, new_position: u32) -> Self {
        Self {
            task_id,
            new_status,
            new_position,
        }
    }
}
