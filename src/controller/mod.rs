//! Store controller: the authoritative side of the note protocol.
//!
//! Every inbound message is an independent transaction against the persisted
//! list: load, validate, apply, persist, reply. Invalid indices, malformed
//! payloads and declined confirmations are dropped without a reply; only
//! storage failures surface as errors.

mod confirm;

pub use confirm::{AutoConfirm, ConfirmPrompt, StdinConfirm, TerminalConfirm, DELETE_PROMPT};

use std::future::Future;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::entity::{Note, NoteColor, NoteList};
use crate::error::Result;
use crate::protocol::{Inbound, Outbound};
use crate::storage::{KeyValueStore, NoteStore};
use crate::theme::ThemeSource;

pub struct StoreController<S, C, T> {
    notes: NoteStore<S>,
    confirm: C,
    theme: T,
}

impl<S, C, T> StoreController<S, C, T>
where
    S: KeyValueStore,
    C: ConfirmPrompt,
    T: ThemeSource,
{
    pub fn new(notes: NoteStore<S>, confirm: C, theme: T) -> Self {
        Self {
            notes,
            confirm,
            theme,
        }
    }

    /// Current persisted notes.
    pub fn notes(&self) -> NoteList {
        self.notes.load()
    }

    pub fn into_store(self) -> NoteStore<S> {
        self.notes
    }

    /// Decode a raw payload and handle it. Unrecognized payloads yield no reply.
    pub fn handle_value(&mut self, raw: &Value) -> Result<Option<Outbound>> {
        match Inbound::from_value(raw) {
            Some(message) => self.handle(message),
            None => Ok(None),
        }
    }

    /// Apply one message and return the reply to push to the surface, if any.
    pub fn handle(&mut self, message: Inbound) -> Result<Option<Outbound>> {
        debug!(message_type = message.kind(), "handling message");

        let mut notes = self.notes.load();

        match message {
            Inbound::Ready => Ok(Some(Outbound::Init {
                value: notes,
                theme: Some(self.theme.current_theme()),
            })),
            Inbound::Save {
                index,
                value,
                color,
            } => {
                let Some(idx) = valid_index(index, notes.len(), "save") else {
                    return Ok(None);
                };
                let note = &mut notes[idx];
                note.text = value;
                if let Some(color) = color {
                    note.color = color;
                }
                self.persist_and_refresh(notes)
            }
            Inbound::Add {
                value,
                color,
                token,
            } => {
                let note = Note::new(value, color.unwrap_or_default());
                notes.push(note.clone());
                self.notes.persist(&notes)?;
                Ok(Some(Outbound::Added {
                    index: notes.len() - 1,
                    value: note.text,
                    color: note.color,
                    token,
                }))
            }
            Inbound::Delete { index } => {
                let Some(idx) = valid_index(index, notes.len(), "delete") else {
                    return Ok(None);
                };
                notes.remove(idx);
                self.persist_and_refresh(notes)
            }
            Inbound::RequestDelete { index } => {
                let Some(idx) = index else {
                    warn!("requestDelete without a valid index, ignoring");
                    return Ok(None);
                };
                if !self.confirm.confirm(DELETE_PROMPT) {
                    info!(index = idx, "delete cancelled");
                    return Ok(None);
                }
                if idx >= notes.len() {
                    warn!(index = idx, len = notes.len(), "confirmed delete out of range, ignoring");
                    return Ok(None);
                }
                notes.remove(idx);
                self.persist_and_refresh(notes)
            }
            Inbound::ChangeColor { index, color } => {
                let Some(idx) = valid_index(index, notes.len(), "changeColor") else {
                    return Ok(None);
                };
                notes[idx].color = color.unwrap_or(NoteColor::Yellow);
                self.persist_and_refresh(notes)
            }
            Inbound::Reorder { value } => self.persist_and_refresh(value),
        }
    }

    fn persist_and_refresh(&mut self, notes: NoteList) -> Result<Option<Outbound>> {
        self.notes.persist(&notes)?;
        Ok(Some(Outbound::Init {
            value: notes,
            theme: None,
        }))
    }

    /// Serve a surface over a pair of FIFO channels until the inbound side
    /// closes, the outbound side is dropped, or `shutdown` resolves.
    ///
    /// A message that fails to persist is logged and skipped; the loop keeps
    /// going. Returns the controller so its store can be reused by the next panel.
    pub async fn run<F>(
        mut self,
        mut inbound: mpsc::UnboundedReceiver<Value>,
        outbound: mpsc::UnboundedSender<Outbound>,
        shutdown: F,
    ) -> Self
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let raw = tokio::select! {
                raw = inbound.recv() => match raw {
                    Some(raw) => raw,
                    None => break,
                },
                _ = &mut shutdown => break,
            };

            match self.handle_value(&raw) {
                Ok(Some(reply)) => {
                    if outbound.send(reply).is_err() {
                        info!("surface disconnected");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, "failed to apply message"),
            }
        }

        debug!("controller loop stopped");
        self
    }
}

fn valid_index(index: Option<usize>, len: usize, op: &'static str) -> Option<usize> {
    match index {
        Some(idx) if idx < len => Some(idx),
        _ => {
            warn!(op, ?index, len, "index out of range, ignoring");
            None
        }
    }
}
