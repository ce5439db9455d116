use serde_json::{Map, Value};

use crate::config::SecretsConfig;

/// Fixed mask inserted in place of hidden secret characters.
pub const MASK: &str = "****";

/// Label shown for a secret field with no value.
pub const NOT_CONFIGURED: &str = "not configured";

/// Key suffixes that mark a field as holding a secret.
///
/// Matched against the key after lowercasing and dropping whitespace, `_`
/// and `-`, so `clientSecret`, `client_secret` and `Client Secret` all hit.
const SECRET_SUFFIXES: &[&str] = &[
    "token",
    "secret",
    "password",
    "passwd",
    "apikey",
    "accesskey",
    "privatekey",
    "secretkey",
    "aeskey",
    "encryptkey",
    "credential",
    "credentials",
    "bearer",
    "cookie",
    "signature",
];

/// Naming-convention secret classifier with display masking.
#[derive(Debug, Clone)]
pub struct SecretPolicy {
    extra_suffixes: Vec<String>,
    unset_label: String,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self {
            extra_suffixes: Vec::new(),
            unset_label: NOT_CONFIGURED.to_string(),
        }
    }
}

impl SecretPolicy {
    pub fn from_config(config: &SecretsConfig) -> Self {
        Self {
            extra_suffixes: config
                .extra_suffixes
                .iter()
                .map(|s| squash_key(s))
                .filter(|s| !s.is_empty())
                .collect(),
            unset_label: config.unset_label.clone(),
        }
    }

    /// Whether `key` names a secret field.
    pub fn is_secret(&self, key: &str) -> bool {
        let squashed = squash_key(key);
        if squashed.is_empty() {
            return false;
        }
        SECRET_SUFFIXES.iter().any(|s| squashed.ends_with(s))
            || self.extra_suffixes.iter().any(|s| squashed.ends_with(s.as_str()))
    }

    /// Display form of a secret value.
    ///
    /// Missing, null, blank and empty-container values show the unset label.
    /// Up to four characters are fully hidden; longer values keep their first
    /// and last two.
    pub fn mask(&self, value: Option<&Value>) -> String {
        let text = match value {
            Some(v) if !is_configured(v) => return self.unset_label.clone(),
            None => return self.unset_label.clone(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= 4 {
            return MASK.to_string();
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{head}{MASK}{tail}")
    }

    /// Replace every secret-keyed scalar in `value` with its masked form.
    /// Secret keys holding records or arrays are masked as a whole.
    pub fn mask_secret_fields(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if self.is_secret(key) {
                        *child = Value::String(self.mask(Some(&*child)));
                    } else {
                        self.mask_secret_fields(child);
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.mask_secret_fields(item);
                }
            }
            _ => {}
        }
    }

    /// Remove every secret-keyed field from `value`, at any depth.
    pub fn strip_secret_fields(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                map.retain(|key, _| !self.is_secret(key));
                for child in map.values_mut() {
                    self.strip_secret_fields(child);
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.strip_secret_fields(item);
                }
            }
            _ => {}
        }
    }

    /// Dotted paths of secret fields that hold a real value, sorted.
    pub fn collect_secret_paths(&self, tree: &Map<String, Value>, prefix: &str) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_into(tree, prefix, &mut paths);
        paths.sort();
        paths
    }

    fn collect_into(&self, map: &Map<String, Value>, prefix: &str, paths: &mut Vec<String>) {
        for (key, child) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if self.is_secret(key) {
                if is_configured(child) {
                    paths.push(path);
                }
            } else if let Value::Object(inner) = child {
                self.collect_into(inner, &path, paths);
            }
        }
    }
}

fn is_configured(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
        _ => true,
    }
}

/// Lowercase `key` with whitespace and word separators removed.
fn squash_key(key: &str) -> String {
    key.split_whitespace()
        .flat_map(str::chars)
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classify `key` with the built-in vocabulary.
pub fn is_secret_key(key: &str) -> bool {
    SecretPolicy::default().is_secret(key)
}

/// Mask `value` for display with the built-in unset label.
pub fn mask_value(value: Option<&Value>) -> String {
    SecretPolicy::default().mask(value)
}

/// Trim raw form input. Blank input means "leave unchanged" and yields `None`.
pub fn normalize_input(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Test helper: recursively check whether any string value in `json` exactly
/// matches one of the provided `secrets`. Returns true if a leak is found.
#[cfg(test)]
pub fn contains_raw_secrets(json: &Value, secrets: &[&str]) -> bool {
    match json {
        Value::String(s) => secrets.contains(&s.as_str()),
        Value::Array(arr) => arr.iter().any(|v| contains_raw_secrets(v, secrets)),
        Value::Object(map) => map.values().any(|v| contains_raw_secrets(v, secrets)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_common_secret_names() {
        for key in [
            "botToken",
            "bot_token",
            "clientSecret",
            "app secret",
            "password",
            "apiKey",
            "api-key",
            "accessKey",
            "privateKey",
            "encodingAesKey",
            "credentials",
            "bearer",
            "sessionCookie",
            "signature",
            "  Access  Token  ",
        ] {
            assert!(is_secret_key(key), "{key} should be secret");
        }
    }

    #[test]
    fn leaves_ordinary_names_alone() {
        for key in ["enabled", "appId", "maxTokens", "allowFrom", "keyword", "", "   "] {
            assert!(!is_secret_key(key), "{key} should not be secret");
        }
    }

    #[test]
    fn extra_suffixes_extend_vocabulary() {
        let policy = SecretPolicy::from_config(&SecretsConfig {
            extra_suffixes: vec!["pin_code".into(), "  ".into()],
            unset_label: NOT_CONFIGURED.into(),
        });
        assert!(policy.is_secret("adminPinCode"));
        assert!(!is_secret_key("adminPinCode"));
        assert!(!policy.is_secret("enabled"));
    }

    #[test]
    fn mask_unset_values() {
        assert_eq!(mask_value(None), NOT_CONFIGURED);
        assert_eq!(mask_value(Some(&Value::Null)), NOT_CONFIGURED);
        assert_eq!(mask_value(Some(&json!(""))), NOT_CONFIGURED);
        assert_eq!(mask_value(Some(&json!("   "))), NOT_CONFIGURED);
        assert_eq!(mask_value(Some(&json!([]))), NOT_CONFIGURED);
        assert_eq!(mask_value(Some(&json!({}))), NOT_CONFIGURED);
    }

    #[test]
    fn mask_short_and_long_values() {
        assert_eq!(mask_value(Some(&json!("abcd"))), "****");
        assert_eq!(mask_value(Some(&json!("a"))), "****");
        assert_eq!(mask_value(Some(&json!("abcdef"))), "ab****ef");
        assert_eq!(mask_value(Some(&json!(1234567))), "12****67");
    }

    #[test]
    fn mask_counts_characters_not_bytes() {
        assert_eq!(mask_value(Some(&json!("密钥密钥密"))), "密钥****钥密");
    }

    #[test]
    fn custom_unset_label() {
        let policy = SecretPolicy::from_config(&SecretsConfig {
            extra_suffixes: vec![],
            unset_label: "(unset)".into(),
        });
        assert_eq!(policy.mask(None), "(unset)");
    }

    #[test]
    fn normalize_input_trims_and_drops_blank() {
        assert_eq!(normalize_input("  tok-1  "), Some("tok-1".to_string()));
        assert_eq!(normalize_input("   "), None);
        assert_eq!(normalize_input(""), None);
    }

    #[test]
    fn mask_secret_fields_hides_nested_values() {
        let mut v = json!({
            "qq": {
                "appId": "10001",
                "clientSecret": "SECRET_QQ_CLIENT",
                "accounts": { "a": { "botToken": "SECRET_BOT_TOKEN", "enabled": true } }
            },
            "list": [{ "apiKey": "SECRET_LIST_KEY" }]
        });
        SecretPolicy::default().mask_secret_fields(&mut v);
        assert!(!contains_raw_secrets(
            &v,
            &["SECRET_QQ_CLIENT", "SECRET_BOT_TOKEN", "SECRET_LIST_KEY"]
        ));
        assert_eq!(v["qq"]["clientSecret"], "SE****NT");
        assert_eq!(v["qq"]["appId"], "10001");
        assert_eq!(v["qq"]["accounts"]["a"]["enabled"], true);
    }

    #[test]
    fn strip_secret_fields_removes_keys() {
        let mut v = json!({
            "qq": { "appId": "1", "clientSecret": "s", "accounts": { "a": { "token": "t" } } }
        });
        SecretPolicy::default().strip_secret_fields(&mut v);
        assert_eq!(v, json!({ "qq": { "appId": "1", "accounts": { "a": {} } } }));
    }

    #[test]
    fn collect_secret_paths_skips_empty() {
        let tree = json!({
            "qq": {
                "clientSecret": "s",
                "token": "",
                "accounts": { "b": { "botToken": "x" }, "a": { "password": null } }
            }
        });
        let paths = SecretPolicy::default()
            .collect_secret_paths(tree.as_object().unwrap(), "channels");
        assert_eq!(
            paths,
            vec![
                "channels.qq.accounts.b.botToken".to_string(),
                "channels.qq.clientSecret".to_string(),
            ]
        );
    }
}
