mod kv_store;
mod note_store;

pub use kv_store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use note_store::{NoteStore, NOTES_KEY};
