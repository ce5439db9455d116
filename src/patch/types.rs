use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a patch does to its path.
///
/// Upstream stores treat a JSON `null` as "delete this path", so a
/// `Set(Value::Null)` is indistinguishable from `Delete` once serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Delete,
    Set(Value),
}

impl PatchValue {
    pub fn is_delete(&self) -> bool {
        matches!(self, PatchValue::Delete)
    }
}

/// A single path-addressed mutation, e.g. `channels.qq.accounts.a.enabled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PatchWire", into = "PatchWire")]
pub struct Patch {
    pub path: String,
    pub value: PatchValue,
}

impl Patch {
    pub fn set(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value: PatchValue::Set(value),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: PatchValue::Delete,
        }
    }

    /// Path split on `.`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }
}

/// On-the-wire shape: `{ "path": "...", "value": <json or null> }`.
#[derive(Serialize, Deserialize)]
struct PatchWire {
    path: String,
    #[serde(default)]
    value: Value,
}

impl From<PatchWire> for Patch {
    fn from(wire: PatchWire) -> Self {
        let value = match wire.value {
            Value::Null => PatchValue::Delete,
            other => PatchValue::Set(other),
        };
        Self {
            path: wire.path,
            value,
        }
    }
}

impl From<Patch> for PatchWire {
    fn from(patch: Patch) -> Self {
        let value = match patch.value {
            PatchValue::Delete => Value::Null,
            PatchValue::Set(v) => v,
        };
        Self {
            path: patch.path,
            value,
        }
    }
}

/// Join a parent path and one segment.
pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delete_serializes_as_null() {
        let p = Patch::delete("channels.qq");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, json!({ "path": "channels.qq", "value": null }));
    }

    #[test]
    fn set_serializes_value_inline() {
        let p = Patch::set("channels.qq.enabled", json!(false));
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, json!({ "path": "channels.qq.enabled", "value": false }));
    }

    #[test]
    fn null_or_missing_value_deserializes_to_delete() {
        let p: Patch =
            serde_json::from_value(json!({ "path": "channels.qq", "value": null })).unwrap();
        assert!(p.value.is_delete());

        let p: Patch = serde_json::from_value(json!({ "path": "channels.qq" })).unwrap();
        assert!(p.value.is_delete());
    }

    #[test]
    fn set_null_collapses_to_delete_on_the_wire() {
        let p = Patch::set("channels.qq.appId", Value::Null);
        let wire = serde_json::to_string(&p).unwrap();
        let back: Patch = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.value, PatchValue::Delete);
    }

    #[test]
    fn join_path_handles_empty_parent() {
        assert_eq!(join_path("", "channels"), "channels");
        assert_eq!(join_path("channels", "qq"), "channels.qq");
    }

    #[test]
    fn segments_split_on_dots() {
        let p = Patch::delete("channels.qq.accounts.a");
        let segs: Vec<&str> = p.segments().collect();
        assert_eq!(segs, vec!["channels", "qq", "accounts", "a"]);
    }
}
