use serde_json::{Map, Value};

use super::types::{Patch, PatchValue};

/// Errors raised while replaying patches against a store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("patch path is empty")]
    EmptyPath,
    #[error("patch path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Anything that accepts an ordered patch list from one diff run.
///
/// Implementations must apply patches sequentially in slice order.
pub trait PatchSink {
    /// Apply every patch; returns how many were applied.
    fn apply(&mut self, patches: &[Patch]) -> Result<usize, ApplyError>;
}

/// Replay `patches` against a JSON root in order.
///
/// `Delete` removes the addressed leaf (a missing path is a no-op). `Set`
/// writes the value, creating intermediate records and replacing any
/// non-record value that sits where a record is needed. Paths are checked
/// up front so a malformed patch leaves `root` untouched.
pub fn apply_patches(root: &mut Value, patches: &[Patch]) -> Result<usize, ApplyError> {
    for patch in patches {
        validate_path(&patch.path)?;
    }

    for patch in patches {
        let segments: Vec<&str> = patch.segments().collect();
        match &patch.value {
            PatchValue::Delete => {
                if !delete_at_path(root, &segments) {
                    tracing::debug!("Delete of missing path {} ignored", patch.path);
                }
            }
            PatchValue::Set(v) => set_at_path(root, &segments, v.clone()),
        }
    }

    Ok(patches.len())
}

fn validate_path(path: &str) -> Result<(), ApplyError> {
    if path.is_empty() {
        return Err(ApplyError::EmptyPath);
    }
    if path.split('.').any(str::is_empty) {
        return Err(ApplyError::EmptySegment(path.to_string()));
    }
    Ok(())
}

/// Set a value at a path of segments, creating intermediate objects.
fn set_at_path(value: &mut Value, segments: &[&str], new_val: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = value;
    for &seg in parents {
        current = record_mut(current).entry(seg.to_string()).or_insert(Value::Null);
    }
    record_mut(current).insert((*leaf).to_string(), new_val);
}

/// Remove the leaf at a path. Returns false when nothing was there.
fn delete_at_path(value: &mut Value, segments: &[&str]) -> bool {
    let Some((leaf, parents)) = segments.split_last() else {
        return false;
    };
    let mut current = value;
    for &seg in parents {
        match current.get_mut(seg) {
            Some(child) if child.is_object() => current = child,
            _ => return false,
        }
    }
    current
        .as_object_mut()
        .map_or(false, |map| map.remove(*leaf).is_some())
}

/// Coerce `slot` into a record and borrow it.
fn record_mut(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just coerced to an object"),
    }
}

/// In-memory authoritative store, mainly for previews and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    root: Value,
}

impl InMemoryStore {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl PatchSink for InMemoryStore {
    fn apply(&mut self, patches: &[Patch]) -> Result<usize, ApplyError> {
        apply_patches(&mut self.root, patches)
    }
}
