pub mod card;
pub mod drag;
pub mod meta;
pub mod placement;

pub use card::{MoveIntent, Status, TaskId};
pub use drag::DragSession;
pub use meta::{DateEdit, TaskMeta};
pub use placement::{insertion_anchor, position_of, Anchor, CardBox, CardRect};
