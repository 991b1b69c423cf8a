//! Message vocabulary exchanged between the store controller and a surface.
//!
//! Outbound messages (controller to surface) are produced by this crate and use
//! plain serde. Inbound messages arrive from a surface that may be stale or
//! buggy, so they are decoded by hand from a JSON value: unknown types are
//! dropped, bad indices become `None`, and payload fields are coerced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::normalize::{coerce_opt, normalize_notes};
use crate::entity::{NoteColor, NoteList};
use crate::theme::ThemeKind;

/// Surface to controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    /// The surface has (re)loaded and needs the full state.
    Ready,
    Save {
        index: Option<usize>,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<NoteColor>,
    },
    Add {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<NoteColor>,
        /// Client-generated token echoed back in `added`.
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    Delete {
        index: Option<usize>,
    },
    RequestDelete {
        index: Option<usize>,
    },
    ChangeColor {
        index: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<NoteColor>,
    },
    /// Replace the whole list with the surface's current on-screen order.
    Reorder {
        value: NoteList,
    },
}

impl Inbound {
    /// Decode a raw channel payload. Returns `None` for anything that is not a
    /// recognizable message; those are dropped without a reply.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let kind = match raw.get("type").and_then(Value::as_str) {
            Some(kind) => kind,
            None => {
                warn!("dropping message without a type");
                return None;
            }
        };

        let value = || coerce_opt(raw.get("value")).unwrap_or_default();
        let color = || coerce_opt(raw.get("color")).map(NoteColor::from);
        let index = || parse_index(raw.get("index"));

        let message = match kind {
            "ready" => Inbound::Ready,
            "save" => Inbound::Save {
                index: index(),
                value: value(),
                color: color(),
            },
            "add" => Inbound::Add {
                value: value(),
                color: color(),
                token: coerce_opt(raw.get("token")),
            },
            "delete" => Inbound::Delete { index: index() },
            "requestDelete" => Inbound::RequestDelete { index: index() },
            "changeColor" => Inbound::ChangeColor {
                index: index(),
                color: color(),
            },
            "reorder" => match raw.get("value") {
                Some(list @ Value::Array(_)) => Inbound::Reorder {
                    value: normalize_notes(list),
                },
                _ => {
                    warn!("dropping reorder without an array payload");
                    return None;
                }
            },
            other => {
                warn!(message_type = other, "dropping unknown message type");
                return None;
            }
        };

        Some(message)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Ready => "ready",
            Inbound::Save { .. } => "save",
            Inbound::Add { .. } => "add",
            Inbound::Delete { .. } => "delete",
            Inbound::RequestDelete { .. } => "requestDelete",
            Inbound::ChangeColor { .. } => "changeColor",
            Inbound::Reorder { .. } => "reorder",
        }
    }

    /// Serialize for the wire.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Only non-negative whole numbers address a note; everything else is `None`.
fn parse_index(value: Option<&Value>) -> Option<usize> {
    let number = match value? {
        Value::Number(number) => number,
        _ => return None,
    };
    if let Some(u) = number.as_u64() {
        return usize::try_from(u).ok();
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 => Some(f as usize),
        _ => None,
    }
}

/// Controller to surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    /// Authoritative full refresh.
    Init {
        value: NoteList,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        theme: Option<ThemeKind>,
    },
    /// Targeted acknowledgment of an append.
    Added {
        index: usize,
        value: String,
        color: NoteColor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    Theme {
        value: ThemeKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Note;
    use serde_json::json;

    #[test]
    fn test_decode_save() {
        let msg = Inbound::from_value(&json!({"type": "save", "index": 2, "value": "hi", "color": "red"}));
        assert_eq!(
            msg,
            Some(Inbound::Save {
                index: Some(2),
                value: "hi".to_string(),
                color: Some(NoteColor::Red),
            })
        );
    }

    #[test]
    fn test_decode_bad_indices() {
        for index in [json!(-1), json!("1"), json!(1.5), json!(null)] {
            let msg = Inbound::from_value(&json!({"type": "delete", "index": index}));
            assert_eq!(msg, Some(Inbound::Delete { index: None }));
        }
        let msg = Inbound::from_value(&json!({"type": "delete", "index": 3.0}));
        assert_eq!(msg, Some(Inbound::Delete { index: Some(3) }));
    }

    #[test]
    fn test_decode_drops_unknown_and_untyped() {
        assert_eq!(Inbound::from_value(&json!({"type": "explode"})), None);
        assert_eq!(Inbound::from_value(&json!({"index": 1})), None);
        assert_eq!(Inbound::from_value(&json!("ready")), None);
    }

    #[test]
    fn test_decode_reorder_requires_array() {
        assert_eq!(Inbound::from_value(&json!({"type": "reorder", "value": "x"})), None);
        let msg = Inbound::from_value(&json!({"type": "reorder", "value": ["a"]}));
        assert_eq!(
            msg,
            Some(Inbound::Reorder {
                value: vec![Note::new("a", NoteColor::Yellow)],
            })
        );
    }

    #[test]
    fn test_decode_add_coerces_fields() {
        let msg = Inbound::from_value(&json!({"type": "add", "value": 7, "token": "t-1"}));
        assert_eq!(
            msg,
            Some(Inbound::Add {
                value: "7".to_string(),
                color: None,
                token: Some("t-1".to_string()),
            })
        );
    }

    #[test]
    fn test_inbound_wire_shape() {
        let msg = Inbound::RequestDelete { index: Some(1) };
        assert_eq!(msg.to_value(), json!({"type": "requestDelete", "index": 1}));
        assert_eq!(Inbound::from_value(&msg.to_value()), Some(msg));
    }

    #[test]
    fn test_outbound_wire_shape() {
        let init = Outbound::Init {
            value: vec![Note::new("a", NoteColor::Cyan)],
            theme: None,
        };
        assert_eq!(
            serde_json::to_value(&init).unwrap(),
            json!({"type": "init", "value": [{"text": "a", "color": "cyan"}]})
        );

        let added = Outbound::Added {
            index: 0,
            value: "hi".to_string(),
            color: NoteColor::Red,
            token: None,
        };
        assert_eq!(
            serde_json::to_value(&added).unwrap(),
            json!({"type": "added", "index": 0, "value": "hi", "color": "red"})
        );

        let theme = Outbound::Theme { value: ThemeKind::Dark };
        assert_eq!(serde_json::to_value(&theme).unwrap(), json!({"type": "theme", "value": 2}));
    }
}
