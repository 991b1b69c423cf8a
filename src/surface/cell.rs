use serde::Serialize;

use crate::entity::{Note, NoteColor};

/// One editable note on the surface.
///
/// `index` is the controller-side position this cell was last told about;
/// `None` marks a new note that has not been acknowledged yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub index: Option<usize>,
    pub text: String,
    pub color: NoteColor,
    /// Temporary token sent with `add`, cleared once bound.
    pub token: Option<String>,
}

impl Cell {
    pub fn bound(index: usize, note: Note) -> Self {
        Self {
            index: Some(index),
            text: note.text,
            color: note.color,
            token: None,
        }
    }

    pub fn pending(token: String) -> Self {
        Self {
            index: None,
            text: String::new(),
            color: NoteColor::Yellow,
            token: Some(token),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.index.is_some()
    }

    pub fn to_note(&self) -> Note {
        Note::new(self.text.clone(), self.color.clone())
    }

    /// Color to display: the note's own color unless it is blank, otherwise
    /// the palette color for its index (yellow for pending cells).
    pub fn display_color(&self) -> NoteColor {
        match (&self.color, self.index) {
            (NoteColor::Other(raw), Some(idx)) if raw.is_empty() => NoteColor::for_index(idx),
            (NoteColor::Other(raw), None) if raw.is_empty() => NoteColor::Yellow,
            (color, _) => color.clone(),
        }
    }
}

/// Style of the trailing add affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddCellStyle {
    Light,
    Dark,
}

/// Render projection of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCell {
    pub index: Option<usize>,
    pub text: String,
    pub color: NoteColor,
    pub draggable: bool,
    pub dragging: bool,
}

/// Everything needed to draw the board: the note cells in order, then the add cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBoard {
    pub cells: Vec<RenderedCell>,
    pub add_cell: AddCellStyle,
}
