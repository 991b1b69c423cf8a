//! Presentation surface model.
//!
//! Holds no authoritative state: the cell list is a cache of the last `init`
//! plus whatever the user has staged locally. Gestures return the message to
//! send to the controller, if any; replies are fed back through [`Surface::apply`].

mod cell;

pub use cell::{AddCellStyle, Cell, RenderedBoard, RenderedCell};

use tracing::{debug, warn};

use crate::entity::{NoteColor, NoteList};
use crate::protocol::{Inbound, Outbound};
use crate::theme::ThemeKind;

#[derive(Debug, Default)]
pub struct Surface {
    cells: Vec<Cell>,
    theme: ThemeKind,
    /// Position of the cell being dragged.
    dragging: Option<usize>,
    next_token: u64,
}

impl Surface {
    /// An empty surface; it must send [`Surface::ready`] to get any notes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&self) -> Inbound {
        Inbound::Ready
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Apply a controller message.
    pub fn apply(&mut self, message: Outbound) {
        match message {
            Outbound::Init { value, theme } => {
                if let Some(theme) = theme {
                    self.theme = theme;
                }
                self.rebuild(value);
            }
            Outbound::Added {
                index,
                value,
                color,
                token,
            } => self.bind_added(index, value, color, token),
            Outbound::Theme { value } => {
                self.theme = value;
            }
        }
    }

    fn rebuild(&mut self, notes: NoteList) {
        debug!(count = notes.len(), "rebuilding surface");
        self.dragging = None;
        self.cells = notes
            .into_iter()
            .enumerate()
            .map(|(idx, note)| Cell::bound(idx, note))
            .collect();
    }

    /// Bind the acknowledged note to its pending cell: the one carrying the
    /// echoed token, or the first unbound cell when there is no token.
    fn bind_added(&mut self, index: usize, value: String, color: NoteColor, token: Option<String>) {
        let target = match &token {
            Some(token) => self
                .cells
                .iter()
                .position(|c| !c.is_bound() && c.token.as_ref() == Some(token)),
            None => self.cells.iter().position(|c| !c.is_bound()),
        };

        let Some(pos) = target else {
            warn!(index, "added acknowledgment has no pending cell");
            return;
        };

        let cell = &mut self.cells[pos];
        cell.index = Some(index);
        cell.text = value;
        cell.color = color;
        cell.token = None;
    }

    /// Insert a new pending cell just before the add affordance. Returns its position.
    pub fn click_add(&mut self) -> usize {
        self.next_token += 1;
        self.cells.push(Cell::pending(format!("new-{}", self.next_token)));
        self.cells.len() - 1
    }

    /// Stage a text edit. Nothing is sent until [`Surface::save`].
    pub fn edit_text(&mut self, pos: usize, text: impl Into<String>) -> bool {
        match self.cells.get_mut(pos) {
            Some(cell) => {
                cell.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Pick a palette color. Bound cells commit immediately.
    pub fn select_color(&mut self, pos: usize, color: NoteColor) -> Option<Inbound> {
        let cell = self.cells.get_mut(pos)?;
        cell.color = color.clone();
        cell.index.map(|idx| Inbound::ChangeColor {
            index: Some(idx),
            color: Some(color),
        })
    }

    /// Save a cell: `save` for bound cells, `add` for the pending one.
    pub fn save(&self, pos: usize) -> Option<Inbound> {
        let cell = self.cells.get(pos)?;
        let message = match cell.index {
            Some(idx) => Inbound::Save {
                index: Some(idx),
                value: cell.text.clone(),
                color: Some(cell.color.clone()),
            },
            None => Inbound::Add {
                value: cell.text.clone(),
                color: Some(cell.color.clone()),
                token: cell.token.clone(),
            },
        };
        Some(message)
    }

    /// Delete a cell. Pending cells are dropped locally; bound cells ask the
    /// controller and stay until the refresh arrives.
    pub fn delete(&mut self, pos: usize) -> Option<Inbound> {
        let cell = self.cells.get(pos)?;
        match cell.index {
            Some(idx) => Some(Inbound::RequestDelete { index: Some(idx) }),
            None => {
                self.cells.remove(pos);
                self.dragging = None;
                None
            }
        }
    }

    /// Start dragging. Only bound cells are draggable.
    pub fn drag_start(&mut self, pos: usize) -> bool {
        match self.cells.get(pos) {
            Some(cell) if cell.is_bound() => {
                self.dragging = Some(pos);
                true
            }
            _ => false,
        }
    }

    /// Move the dragged cell next to `target`, before it or after it.
    /// Purely local; nothing is sent.
    pub fn drag_over(&mut self, target: usize, after: bool) {
        let Some(from) = self.dragging else {
            return;
        };
        if target == from || target >= self.cells.len() {
            return;
        }

        let cell = self.cells.remove(from);
        // Removing `from` shifts everything after it one slot left.
        let target = if target > from { target - 1 } else { target };
        let dest = if after { target + 1 } else { target };
        self.cells.insert(dest, cell);
        self.dragging = Some(dest);
    }

    /// Finish a drag: submit the whole on-screen list, in its new order.
    pub fn drop_dragged(&mut self) -> Option<Inbound> {
        self.dragging.take()?;
        Some(Inbound::Reorder {
            value: self.cells.iter().map(Cell::to_note).collect(),
        })
    }

    /// Abandon a drag without submitting.
    pub fn drag_end(&mut self) {
        self.dragging = None;
    }

    /// Pure projection of the current state.
    pub fn render(&self) -> RenderedBoard {
        RenderedBoard {
            cells: self
                .cells
                .iter()
                .enumerate()
                .map(|(pos, cell)| RenderedCell {
                    index: cell.index,
                    text: cell.text.clone(),
                    color: cell.display_color(),
                    draggable: cell.is_bound(),
                    dragging: self.dragging == Some(pos),
                })
                .collect(),
            add_cell: if self.theme.is_dark() {
                AddCellStyle::Dark
            } else {
                AddCellStyle::Light
            },
        }
    }
}
