//! Command restriction entity and command-name normalization

use crate::value_objects::ChatId;

/// Per-chat minimum priority for a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRestriction {
    pub chat_id: ChatId,
    pub command: String,
    pub required_priority: i32,
}

/// Normalize a command name: trim, drop the leading slash and any
/// `@botname` suffix, lowercase.
pub fn normalize_command(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('/');
    let base = trimmed.split('@').next().unwrap_or_default();
    base.to_lowercase()
}

/// Extract the normalized command from message text (`/ban@bot user` -> `ban`)
pub fn extract_command_name(text: &str) -> Option<String> {
    let text = text.trim_start();
    if !text.starts_with('/') {
        return None;
    }
    let first = text.split_whitespace().next()?;
    let name = normalize_command(first);
    (!name.is_empty()).then_some(name)
}
