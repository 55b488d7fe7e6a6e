//! `/command@bot args` parsing

use modbot_core::normalize_command;

/// A leading bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lower-cased name without slash or `@bot` suffix
    pub name: String,
    /// Everything after the first whitespace, trimmed
    pub args: String,
}

impl Command {
    /// Parse a command addressed to this bot. `/cmd@other_bot` is ignored
    /// unless `bot_username` is empty.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let text = text.trim_start();
        if !text.starts_with('/') {
            return None;
        }
        let (head, args) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };

        if let Some((_, addressee)) = head.split_once('@') {
            if !bot_username.is_empty() && !addressee.eq_ignore_ascii_case(bot_username) {
                return None;
            }
        }

        let name = normalize_command(head);
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            args: args.to_string(),
        })
    }
}
