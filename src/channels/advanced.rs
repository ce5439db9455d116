use serde_json::{Map, Value};

use crate::console::masking::SecretPolicy;

/// Fields a channel node form edits directly.
pub const CHANNEL_KNOWN_KEYS: &[&str] = &[
    "enabled",
    "dmPolicy",
    "allowFrom",
    "groupPolicy",
    "requireMention",
    "groupAllowFrom",
    "groups",
    "appId",
    "markdownSupport",
    "accounts",
    "secretFields",
];

/// Fields an account node form edits directly.
pub const ACCOUNT_KNOWN_KEYS: &[&str] = &[
    "enabled",
    "dmPolicy",
    "allowFrom",
    "groupPolicy",
    "requireMention",
    "groupAllowFrom",
    "groups",
];

fn is_advanced(key: &str, known_keys: &[&str], policy: &SecretPolicy) -> bool {
    !known_keys.contains(&key) && !policy.is_secret(key)
}

/// Copy of every field of `node` that is neither known nor secret.
pub fn extract_advanced(node: &Map<String, Value>, known_keys: &[&str]) -> Map<String, Value> {
    extract_advanced_with(node, known_keys, &SecretPolicy::default())
}

/// Copy of `node` whose advanced fields are replaced by `advanced`.
///
/// Known and secret fields of `node` are kept as they are, and any known or
/// secret keys inside `advanced` are ignored. Feeding back the output of
/// [`extract_advanced`] unchanged returns a copy equal to `node`.
pub fn apply_advanced(
    node: &Map<String, Value>,
    known_keys: &[&str],
    advanced: &Map<String, Value>,
) -> Map<String, Value> {
    apply_advanced_with(node, known_keys, advanced, &SecretPolicy::default())
}

pub fn extract_advanced_with(
    node: &Map<String, Value>,
    known_keys: &[&str],
    policy: &SecretPolicy,
) -> Map<String, Value> {
    node.iter()
        .filter(|(k, _)| is_advanced(k, known_keys, policy))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

pub fn apply_advanced_with(
    node: &Map<String, Value>,
    known_keys: &[&str],
    advanced: &Map<String, Value>,
    policy: &SecretPolicy,
) -> Map<String, Value> {
    let mut next: Map<String, Value> = node
        .iter()
        .filter(|(k, _)| !is_advanced(k, known_keys, policy))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for (key, value) in advanced {
        if is_advanced(key, known_keys, policy) {
            next.insert(key.clone(), value.clone());
        } else {
            tracing::debug!("Ignoring reserved key '{key}' in advanced fields");
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn extract_skips_known_and_secret_fields() {
        let node = obj(json!({
            "enabled": true,
            "appId": "1",
            "clientSecret": "s",
            "sandbox": true,
            "endpoint": { "url": "https://example.test" }
        }));
        let adv = extract_advanced(&node, CHANNEL_KNOWN_KEYS);
        assert_eq!(
            Value::Object(adv),
            json!({ "sandbox": true, "endpoint": { "url": "https://example.test" } })
        );
    }

    #[test]
    fn apply_replaces_previous_advanced_fields() {
        let node = obj(json!({ "enabled": true, "old": 1, "botToken": "t" }));
        let next = apply_advanced(&node, ACCOUNT_KNOWN_KEYS, &obj(json!({ "new": 2 })));
        assert_eq!(
            Value::Object(next),
            json!({ "enabled": true, "botToken": "t", "new": 2 })
        );
    }

    #[test]
    fn apply_ignores_known_and_secret_keys_in_payload() {
        let node = obj(json!({ "enabled": true, "clientSecret": "keep" }));
        let payload = obj(json!({ "enabled": false, "clientSecret": "evil", "extra": "x" }));
        let next = apply_advanced(&node, CHANNEL_KNOWN_KEYS, &payload);
        assert_eq!(
            Value::Object(next),
            json!({ "enabled": true, "clientSecret": "keep", "extra": "x" })
        );
    }

    #[test]
    fn round_trip_without_edits_is_identity() {
        let node = obj(json!({
            "enabled": true,
            "accounts": { "a": { "enabled": true } },
            "appSecret": "s",
            "retry": { "max": 3 },
            "proxy": "socks5://127.0.0.1:1080"
        }));
        let adv = extract_advanced(&node, CHANNEL_KNOWN_KEYS);
        assert_eq!(apply_advanced(&node, CHANNEL_KNOWN_KEYS, &adv), node);
    }

    #[test]
    fn policy_extras_are_protected() {
        let policy = SecretPolicy::from_config(&crate::config::SecretsConfig {
            extra_suffixes: vec!["pin".into()],
            unset_label: "not configured".into(),
        });
        let node = obj(json!({ "adminPin": "1234", "note": "n" }));
        let adv = extract_advanced_with(&node, ACCOUNT_KNOWN_KEYS, &policy);
        assert_eq!(Value::Object(adv), json!({ "note": "n" }));
    }
}
