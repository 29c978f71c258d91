//! Field-level change summaries for audit entries

use serde_json::Value;

/// Bookkeeping fields that change on every save and are left out of diffs
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_CHARS: usize = 50;

/// Summarize the top-level differences between two entity snapshots
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                if IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                match after_obj.get(key) {
                    Some(after_val) if after_val != before_val => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    Some(_) => {}
                    None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            changes
        }
        _ if before != after => vec![format!("{} -> {}", format_value(before), format_value(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let head: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_fields_only() {
        let before = json!({"agency": "MS", "transfer_amount": 1000, "status": "PROPOSTA"});
        let after = json!({"agency": "MS", "transfer_amount": 1500, "status": "EXECUCAO"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("transfer_amount: 1000 -> 1500"));
        assert!(diff.contains("status: \"PROPOSTA\" -> \"EXECUCAO\""));
        assert!(!diff.contains("agency"));
    }

    #[test]
    fn test_added_and_removed() {
        let before = json!({"notes": "x"});
        let after = json!({"modality": "PREGAO"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("notes: \"x\" -> (removed)"));
        assert!(diff.contains("modality: (added) -> \"PREGAO\""));
    }

    #[test]
    fn test_timestamp_only_change_is_no_diff() {
        let before = json!({"agency": "MS", "updated_at": "2024-01-01T00:00:00Z"});
        let after = json!({"agency": "MS", "updated_at": "2024-02-01T00:00:00Z"});
        assert!(generate_diff(&before, &after).is_none());
    }

    #[test]
    fn test_long_accented_string_truncates_on_char_boundary() {
        let long = "ção".repeat(40);
        let diff = generate_diff(&json!({"object": long}), &json!({"object": "curto"})).unwrap();
        assert!(diff.contains("...\""));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2 fields}");
    }
}
