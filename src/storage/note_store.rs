use serde_json::Value;
use tracing::debug;

use super::KeyValueStore;
use crate::entity::NoteList;
use crate::error::Result;
use crate::protocol::normalize_notes;

/// Default key holding the persisted note list.
pub const NOTES_KEY: &str = "postit.notes";

/// The persisted note list, kept under a single key of a [`KeyValueStore`].
///
/// Reads always go through normalization, so legacy or hand-edited state
/// loads as a best-effort list instead of failing.
pub struct NoteStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> NoteStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, NOTES_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Current notes; an empty list when nothing has been stored yet.
    pub fn load(&self) -> NoteList {
        normalize_notes(&self.store.get_or(&self.key, Value::Array(Vec::new())))
    }

    /// Replace the persisted list.
    pub fn persist(&mut self, notes: &NoteList) -> Result<()> {
        debug!(key = %self.key, count = notes.len(), "persisting notes");
        self.store.set(&self.key, serde_json::to_value(notes)?)
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Note, NoteColor};
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_load_empty_on_first_use() {
        let store = NoteStore::new(MemoryStore::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_persist_then_load_is_normalized() {
        let mut store = NoteStore::new(MemoryStore::new());
        let notes = vec![
            Note::new("a", NoteColor::Green),
            Note::new("b", NoteColor::Other("teal".to_string())),
        ];
        store.persist(&notes).unwrap();
        assert_eq!(store.load(), notes);
    }

    #[test]
    fn test_legacy_state_is_normalized_on_load() {
        let mut kv = MemoryStore::new();
        kv.set(NOTES_KEY, json!(["old note", {"text": "new"}])).unwrap();

        let store = NoteStore::new(kv);
        assert_eq!(
            store.load(),
            vec![
                Note::new("old note", NoteColor::Yellow),
                Note::new("new", NoteColor::Yellow),
            ]
        );
    }

    #[test]
    fn test_custom_key() {
        let mut store = NoteStore::with_key(MemoryStore::new(), "board.a");
        store.persist(&vec![Note::new("x", NoteColor::Red)]).unwrap();
        assert!(store.inner().get("board.a").is_some());
        assert!(store.inner().get(NOTES_KEY).is_none());
    }
}
