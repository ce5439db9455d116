use serde_json::{json, Map, Value};

use super::identity::normalize_channel_key;

/// Channel key -> channel node. Keys are lowercase and iterate sorted.
pub type ConfigTree = Map<String, Value>;

const ACCOUNTS_KEY: &str = "accounts";

/// Pull the `channels` section out of a full Gateway config snapshot.
///
/// A missing or malformed section yields an empty tree.
pub fn channels_from_snapshot(root: &Value) -> ConfigTree {
    match root.get("channels") {
        Some(Value::Object(channels)) => channels.clone(),
        Some(other) => {
            tracing::warn!("Snapshot 'channels' is not an object ({other}), treating as empty");
            ConfigTree::new()
        }
        None => ConfigTree::new(),
    }
}

fn fresh_node() -> Value {
    json!({ "enabled": true })
}

/// Borrow `slot` as a record, replacing anything else with `seed()`.
fn ensure_record(slot: &mut Value, seed: fn() -> Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = seed();
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just seeded with an object"),
    }
}

/// Get the node for channel `key`, creating `{ "enabled": true }` when it is
/// missing or not a record. Edits through the returned borrow land in `tree`.
pub fn ensure_channel<'a>(tree: &'a mut ConfigTree, key: &str) -> &'a mut Map<String, Value> {
    let slot = tree.entry(normalize_channel_key(key)).or_insert(Value::Null);
    ensure_record(slot, fresh_node)
}

/// Get the node for `account_id` under channel `key`, creating the channel,
/// its `accounts` map and the account (`{ "enabled": true }`) as needed.
pub fn ensure_account<'a>(
    tree: &'a mut ConfigTree,
    key: &str,
    account_id: &str,
) -> &'a mut Map<String, Value> {
    let channel = ensure_channel(tree, key);
    let accounts = channel.entry(ACCOUNTS_KEY).or_insert(Value::Null);
    let accounts = ensure_record(accounts, || Value::Object(Map::new()));
    let slot = accounts.entry(account_id).or_insert(Value::Null);
    ensure_record(slot, fresh_node)
}

/// Remove `account_id` from channel `key`. Returns whether anything was removed.
pub fn remove_account(tree: &mut ConfigTree, key: &str, account_id: &str) -> bool {
    tree.get_mut(&normalize_channel_key(key))
        .and_then(|channel| channel.get_mut(ACCOUNTS_KEY))
        .and_then(Value::as_object_mut)
        .map_or(false, |accounts| accounts.remove(account_id).is_some())
}
