use serde::{Deserialize, Serialize};

/// Color of a sticky note.
///
/// The four palette colors are typed; any other string found in persisted or
/// incoming data is kept verbatim in `Other` so it survives a round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteColor {
    Cyan,
    #[default]
    Yellow,
    Red,
    Green,
    Other(String),
}

impl NoteColor {
    /// Palette order used by the surface when a note has no usable color.
    pub const PALETTE: [NoteColor; 4] = [
        NoteColor::Cyan,
        NoteColor::Yellow,
        NoteColor::Red,
        NoteColor::Green,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            NoteColor::Cyan => "cyan",
            NoteColor::Yellow => "yellow",
            NoteColor::Red => "red",
            NoteColor::Green => "green",
            NoteColor::Other(raw) => raw,
        }
    }

    /// Palette color for a position, cycling cyan, yellow, red, green.
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()].clone()
    }
}

impl From<String> for NoteColor {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "cyan" => NoteColor::Cyan,
            "yellow" => NoteColor::Yellow,
            "red" => NoteColor::Red,
            "green" => NoteColor::Green,
            _ => NoteColor::Other(raw),
        }
    }
}

impl From<&str> for NoteColor {
    fn from(raw: &str) -> Self {
        NoteColor::from(raw.to_string())
    }
}

impl From<NoteColor> for String {
    fn from(color: NoteColor) -> Self {
        match color {
            NoteColor::Other(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for NoteColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Strict parse for user-facing input: only palette colors are accepted.
impl std::str::FromStr for NoteColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match NoteColor::from(s.to_lowercase()) {
            NoteColor::Other(_) => Err(format!("Invalid color: {}", s)),
            color => Ok(color),
        }
    }
}

/// A single sticky note. Identity is its position in the [`NoteList`](super::NoteList).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub color: NoteColor,
}

impl Note {
    pub fn new(text: impl Into<String>, color: NoteColor) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_colors_parse() {
        assert_eq!(NoteColor::from("cyan"), NoteColor::Cyan);
        assert_eq!(NoteColor::from("green"), NoteColor::Green);
        assert_eq!("RED".parse::<NoteColor>().unwrap(), NoteColor::Red);
    }

    #[test]
    fn test_unknown_color_kept_verbatim() {
        let color = NoteColor::from("purple");
        assert_eq!(color, NoteColor::Other("purple".to_string()));
        assert_eq!(String::from(color), "purple");
        assert!("purple".parse::<NoteColor>().is_err());
    }

    #[test]
    fn test_for_index_cycles() {
        assert_eq!(NoteColor::for_index(0), NoteColor::Cyan);
        assert_eq!(NoteColor::for_index(3), NoteColor::Green);
        assert_eq!(NoteColor::for_index(5), NoteColor::Yellow);
    }

    #[test]
    fn test_note_serializes_as_plain_strings() {
        let note = Note::new("hi", NoteColor::Red);
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi", "color": "red"}));

        let parsed: Note = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, note);
    }
}
