pub mod channels;
pub mod config;
pub mod console;
pub mod patch;

pub use channels::advanced::{
    apply_advanced, extract_advanced, ACCOUNT_KNOWN_KEYS, CHANNEL_KNOWN_KEYS,
};
pub use channels::identity::{
    derive_account_id, derive_channel_key, normalize_channel_key, ChannelDescriptor,
};
pub use channels::tree::{
    channels_from_snapshot, ensure_account, ensure_channel, remove_account, ConfigTree,
};
pub use console::masking::{is_secret_key, mask_value, normalize_input, SecretPolicy};
pub use patch::apply::{apply_patches, ApplyError, InMemoryStore, PatchSink};
pub use patch::diff::{build_patches, build_patches_with};
pub use patch::types::{Patch, PatchValue};
