use serde::{Deserialize, Serialize};

/// Placeholder key when no identifier yields a channel.
pub const UNKNOWN_CHANNEL: &str = "unknown";

/// Account id used when none can be resolved.
pub const DEFAULT_ACCOUNT: &str = "default";

/// Separators tried, in order, to find the channel head of a composite id.
const CHANNEL_ID_SEPARATORS: &[char] = &[':', '/', '@'];

/// Separators tried, in order, to find the account tail of a composite id.
const ACCOUNT_ID_SEPARATORS: &[char] = &[':', '/', '@', '#'];

/// A channel status record as reported by the Gateway.
///
/// Older Gateway builds only send a composite `id` such as `qq:acct1`; newer
/// ones fill the explicit fields. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub channel_key: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

/// Trim and lowercase a channel key.
pub fn normalize_channel_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Resolve the channel key of a status record.
///
/// Order: explicit `channelKey`, then `platform` (unless it is the
/// `unknown` placeholder), then the head of the composite `id`, then
/// `unknown`.
pub fn derive_channel_key(channel: &ChannelDescriptor) -> String {
    if let Some(key) = non_blank(channel.channel_key.as_ref()) {
        return normalize_channel_key(key);
    }

    if let Some(platform) = non_blank(channel.platform.as_ref()) {
        let platform = normalize_channel_key(platform);
        if platform != UNKNOWN_CHANNEL {
            return platform;
        }
    }

    if let Some(id) = non_blank(channel.id.as_ref()) {
        let head = CHANNEL_ID_SEPARATORS
            .iter()
            .find(|sep| id.contains(**sep))
            .and_then(|sep| id.split(*sep).next())
            .unwrap_or(id);
        let head = normalize_channel_key(head);
        if !head.is_empty() {
            return head;
        }
    }

    UNKNOWN_CHANNEL.to_string()
}

/// Resolve the account id of a status record.
///
/// Order: explicit `accountId`, then `accountName`, then a tail segment of
/// the composite `id`, then `default`.
pub fn derive_account_id(channel: &ChannelDescriptor) -> String {
    if let Some(id) = non_blank(channel.account_id.as_ref()) {
        return id.to_string();
    }
    if let Some(name) = non_blank(channel.account_name.as_ref()) {
        return name.to_string();
    }
    if let Some(id) = non_blank(channel.id.as_ref()) {
        let key = derive_channel_key(channel);
        if let Some(tail) = account_from_composite(id, &key) {
            return tail;
        }
    }
    DEFAULT_ACCOUNT.to_string()
}

fn account_from_composite(id: &str, channel_key: &str) -> Option<String> {
    for sep in ACCOUNT_ID_SEPARATORS {
        if !id.contains(*sep) {
            continue;
        }
        let tail = id
            .split(*sep)
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .rev()
            .find(|seg| normalize_channel_key(seg) != channel_key);
        if let Some(tail) = tail {
            return Some(tail.to_string());
        }
    }

    // `<key>.<account>`, where the head matches the key case-insensitively.
    id.char_indices()
        .filter(|(_, c)| *c == '.')
        .find(|(at, _)| id[..*at].to_lowercase() == channel_key)
        .map(|(at, _)| id[at + 1..].trim())
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}
