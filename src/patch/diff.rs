use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::types::{join_path, Patch};
use super::value::{detached, structurally_equal};
use crate::channels::tree::ConfigTree;
use crate::console::masking::SecretPolicy;

/// Root segment of every emitted patch path.
pub const CHANNELS_ROOT: &str = "channels";

const ACCOUNTS_SUFFIX: &str = ".accounts";

/// Compute the ordered patch list that turns `before` into `after`, using the
/// built-in secret vocabulary.
///
/// Channels are visited in sorted key order. A channel missing from `after`
/// becomes a single delete, a channel missing from `before` a single
/// whole-subtree insert; everything else is diffed field by field.
/// Neither input is modified and every emitted value is a detached copy.
pub fn build_patches(before: &ConfigTree, after: &ConfigTree) -> Vec<Patch> {
    build_patches_with(before, after, &SecretPolicy::default())
}

/// [`build_patches`] with a caller-supplied secret policy.
///
/// Secret fields are never diffed: a secret key in a record is skipped on
/// both sides, and every inserted or replaced subtree has its secret fields
/// stripped before it is emitted.
pub fn build_patches_with(
    before: &ConfigTree,
    after: &ConfigTree,
    policy: &SecretPolicy,
) -> Vec<Patch> {
    let mut out = Vec::new();

    for key in sorted_key_union(before, after) {
        let path = join_path(CHANNELS_ROOT, key);
        match (before.get(key), after.get(key)) {
            (Some(_), None) => out.push(Patch::delete(path)),
            (None, Some(next)) => push_replace(&path, next, policy, &mut out),
            (Some(prev), Some(next)) => diff_node(prev, next, &path, policy, &mut out),
            (None, None) => {}
        }
    }

    tracing::debug!("Built {} config patches", out.len());
    out
}

/// Recursively diff two values rooted at `path`, appending patches to `out`.
pub fn diff_node(
    before: &Value,
    after: &Value,
    path: &str,
    policy: &SecretPolicy,
    out: &mut Vec<Patch>,
) {
    if structurally_equal(Some(before), Some(after)) {
        return;
    }

    if path.ends_with(ACCOUNTS_SUFFIX) {
        diff_accounts(before, after, path, policy, out);
        return;
    }

    // Lists have no stable element identity, so they are replaced whole.
    if before.is_array() || after.is_array() {
        push_replace(path, after, policy, out);
        return;
    }

    let (Value::Object(prev), Value::Object(next)) = (before, after) else {
        push_replace(path, after, policy, out);
        return;
    };

    for key in sorted_key_union(prev, next) {
        if policy.is_secret(key) {
            continue;
        }
        let child = join_path(path, key);
        match (prev.get(key), next.get(key)) {
            (Some(_), None) => out.push(Patch::delete(child)),
            (None, Some(v)) => push_replace(&child, v, policy, out),
            (Some(p), Some(n)) => diff_node(p, n, &child, policy, out),
            (None, None) => {}
        }
    }
}

/// Account maps are diffed per account only while the set of account ids is
/// unchanged. Adding or removing an account replaces the whole map.
fn diff_accounts(
    before: &Value,
    after: &Value,
    path: &str,
    policy: &SecretPolicy,
    out: &mut Vec<Patch>,
) {
    let (Value::Object(prev), Value::Object(next)) = (before, after) else {
        push_replace(path, after, policy, out);
        return;
    };

    let prev_ids: BTreeSet<&str> = prev.keys().map(String::as_str).collect();
    let next_ids: BTreeSet<&str> = next.keys().map(String::as_str).collect();
    if prev_ids != next_ids {
        tracing::debug!(
            "Account set changed at {path} ({} -> {} accounts), replacing map",
            prev_ids.len(),
            next_ids.len()
        );
        push_replace(path, after, policy, out);
        return;
    }

    for id in next_ids {
        if let (Some(p), Some(n)) = (prev.get(id), next.get(id)) {
            diff_node(p, n, &join_path(path, id), policy, out);
        }
    }
}

fn push_replace(path: &str, after: &Value, policy: &SecretPolicy, out: &mut Vec<Patch>) {
    if after.is_null() {
        tracing::warn!("Patch at {path} sets null; upstream will treat it as a delete");
    }
    if let Some(mut value) = detached(Some(after)) {
        policy.strip_secret_fields(&mut value);
        out.push(Patch::set(path, value));
    }
}

fn sorted_key_union<'a>(
    a: &'a Map<String, Value>,
    b: &'a Map<String, Value>,
) -> BTreeSet<&'a str> {
    a.keys().chain(b.keys()).map(String::as_str).collect()
}
