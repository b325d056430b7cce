//! # Taskboard Client
//!
//! Client-side controller for a kanban task board embedded in a web page.
//!
//! Cards are reordered live while they are dragged (optimistically, before
//! the server hears about it) and the final placement is then sent to the
//! server as a move of `{task_id, new_status, new_position}`. The engine is
//! written against small view traits so it runs the same against the
//! browser DOM and against the in-memory board used by the tests.

pub mod actions;
pub mod config;
pub mod controller;
pub mod domain;
pub mod dropzone;
pub mod error;
pub mod registry;
pub mod sync;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-export commonly used types
pub use actions::Actions;
pub use config::ClientConfig;
pub use controller::BoardController;
pub use domain::{
    card::{MoveIntent, Status, TaskId},
    drag::DragSession,
    meta::TaskMeta,
    placement::{insertion_anchor, Anchor},
};
pub use error::{BoardError, Result};
pub use sync::{SyncClient, SyncError, Transport};
pub use view::{Bindable, BoardView, PageShell};
