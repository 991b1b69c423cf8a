//! Coercion of arbitrary note data into canonical [`Note`]s.
//!
//! Persisted state and `reorder` payloads come from outside the controller and
//! may be legacy (bare strings), partial, or simply wrong. Nothing here fails:
//! anything unrecognizable degrades to a best-effort note or an empty list.

use serde_json::Value;

use crate::entity::{Note, NoteColor, NoteList};

/// Normalize any JSON value into a note list.
///
/// Non-arrays become an empty list. Each entry becomes a note:
/// - a string is the note text, colored yellow
/// - an object contributes `text` and `color`, coerced to strings
/// - anything else yields an empty yellow note
pub fn normalize_notes(raw: &Value) -> NoteList {
    match raw {
        Value::Array(items) => items.iter().map(normalize_entry).collect(),
        _ => Vec::new(),
    }
}

fn normalize_entry(item: &Value) -> Note {
    match item {
        Value::String(text) => Note::new(text.clone(), NoteColor::Yellow),
        Value::Object(map) => Note {
            text: coerce_or(map.get("text"), ""),
            color: NoteColor::from(coerce_or(map.get("color"), "yellow")),
        },
        _ => Note::default(),
    }
}

/// Coerce an optional field to a string, using `default` when it is absent or null.
pub fn coerce_or(value: Option<&Value>, default: &str) -> String {
    coerce_opt(value).unwrap_or_else(|| default.to_string())
}

/// Coerce an optional field to a string; absent and null stay `None`.
pub fn coerce_opt(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(to_display_string(v)),
    }
}

/// Loose string conversion for JSON values, matching how a dynamic client
/// would stringify them: integers without a fraction, arrays comma-joined,
/// objects as an opaque marker.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_number).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip form of a float, laid out the way a JS runtime prints
/// numbers: plain decimals for exponents in `-7..21`, otherwise `d.ddde+N`.
fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest digits as `d.ddde<exp>`.
    let sci = format!("{:e}", value.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let exp_sign = if e < 0 { "-" } else { "+" };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", lead, exp_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", lead, rest, exp_sign, e.abs())
        }
    };

    format!("{}{}", sign, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_legacy_entries() {
        let raw = json!(["plain string", {"text": 5, "color": null}, "x"]);
        let notes = normalize_notes(&raw);
        assert_eq!(
            notes,
            vec![
                Note::new("plain string", NoteColor::Yellow),
                Note::new("5", NoteColor::Yellow),
                Note::new("x", NoteColor::Yellow),
            ]
        );
    }

    #[test]
    fn test_non_array_is_empty() {
        assert!(normalize_notes(&json!(null)).is_empty());
        assert!(normalize_notes(&json!({"text": "a"})).is_empty());
        assert!(normalize_notes(&json!("a")).is_empty());
    }

    #[test]
    fn test_normalizing_normalized_list_is_identity() {
        let raw = json!([{"text": "a", "color": "red"}, "b", {"color": "cyan"}]);
        let once = normalize_notes(&raw);
        let twice = normalize_notes(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_scalar_entries_become_empty_yellow_notes() {
        let notes = normalize_notes(&json!([42, true, null, [1, 2]]));
        assert_eq!(notes.len(), 4);
        assert!(notes.iter().all(|n| n == &Note::default()));
    }

    #[test]
    fn test_unknown_color_survives() {
        let notes = normalize_notes(&json!([{"text": "t", "color": "purple"}]));
        assert_eq!(notes[0].color, NoteColor::Other("purple".to_string()));
    }

    #[test]
    fn test_display_string_coercion() {
        assert_eq!(to_display_string(&json!(5)), "5");
        assert_eq!(to_display_string(&json!(-3)), "-3");
        assert_eq!(to_display_string(&json!(1.5)), "1.5");
        assert_eq!(to_display_string(&json!(123.456)), "123.456");
        assert_eq!(to_display_string(&json!(false)), "false");
        assert_eq!(to_display_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_display_string(&json!({"k": 1})), "[object Object]");
    }

    #[test]
    fn test_float_formatting_edges() {
        assert_eq!(to_display_string(&json!(1e21)), "1e+21");
        assert_eq!(to_display_string(&json!(1.5e300)), "1.5e+300");
        assert_eq!(to_display_string(&json!(1e-7)), "1e-7");
        assert_eq!(to_display_string(&json!(2.5e-8)), "2.5e-8");
        assert_eq!(to_display_string(&json!(0.000001)), "0.000001");
        assert_eq!(to_display_string(&json!(-0.0)), "0");
        assert_eq!(to_display_string(&json!(-12.5)), "-12.5");
        assert_eq!(to_display_string(&json!(1e20)), "100000000000000000000");
        assert_eq!(to_display_string(&json!(4.0)), "4");
    }
}
