//! Free-form argument parsing for moderation commands
//!
//! `/ban @user 1d spam`, `/ban 1d @user spam` and a reply with `/ban 1d spam`
//! all yield the same target, duration and reason.

use modbot_core::value_objects::{parse_duration, DurationToken, UserId};
use tracing::debug;

use super::context::ServiceContext;

/// Target, duration and reason extracted from a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub user_id: UserId,
    /// `None` when no duration token was given
    pub duration: Option<DurationToken>,
    pub reason: String,
}

impl ParsedArgs {
    /// Requested span; absent and permanent tokens both mean "no expiry"
    pub fn span(&self) -> Option<chrono::Duration> {
        self.duration.and_then(|t| t.as_duration())
    }
}

pub struct ArgParser<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ArgParser<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the target from the replied-to author, else from the first
    /// `@username` that the directory knows or bare positive integer. The
    /// first remaining token that parses as a duration is the duration; the
    /// rest joined is the reason. `None` when no target can be determined.
    pub async fn parse_moderation_args(
        &self,
        reply_to: Option<UserId>,
        args_text: &str,
        language: Option<&str>,
    ) -> Option<ParsedArgs> {
        let mut tokens: Vec<&str> = args_text.split_whitespace().collect();

        let user_id = match reply_to {
            Some(user_id) => user_id,
            None => {
                let (index, user_id) = self.find_target(&tokens).await?;
                tokens.remove(index);
                user_id
            }
        };

        let duration = tokens
            .iter()
            .enumerate()
            .find_map(|(i, token)| parse_duration(token).map(|d| (i, d)));
        if let Some((index, _)) = duration {
            tokens.remove(index);
        }

        let reason = if tokens.is_empty() {
            self.ctx.tr(
                "moderation.reason.default",
                language,
                "No reason provided",
                &[],
            )
        } else {
            tokens.join(" ")
        };

        Some(ParsedArgs {
            user_id,
            duration: duration.map(|(_, d)| d),
            reason,
        })
    }

    /// Index and id of the first token naming a user
    pub async fn find_target(&self, tokens: &[&str]) -> Option<(usize, UserId)> {
        for (index, token) in tokens.iter().enumerate() {
            if token.starts_with('@') {
                match self.ctx.directory().resolve_username(token).await {
                    Ok(Some(user_id)) => return Some((index, user_id)),
                    Ok(None) => {}
                    Err(e) => debug!(username = %token, error = %e, "Username lookup failed"),
                }
                continue;
            }
            if let Some(user_id) = parse_user_id(token) {
                return Some((index, user_id));
            }
        }
        None
    }
}

/// Bare positive integer ids; `0` stays a duration token
pub fn parse_user_id(token: &str) -> Option<UserId> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<i64>().ok().filter(|id| *id > 0).map(UserId::new)
}
