mod note;

pub use note::{Note, NoteColor};

/// Ordered, densely indexed notes: insertion order is display order is persisted order.
pub type NoteList = Vec<Note>;
