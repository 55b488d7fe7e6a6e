//! HTML fragments shared by the reply renderers

use chrono::{DateTime, Utc};

use modbot_core::value_objects::{ChatId, UserId};

use super::context::ServiceContext;

/// Escape text for the platform's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Clickable profile link around an already-chosen label
pub fn user_link(user_id: UserId, label: &str) -> String {
    format!(
        r#"<a href="tg://user?id={}">{}</a>"#,
        user_id,
        escape_html(label)
    )
}

/// `2024-05-01 13:45 UTC`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Best label for a user: stored name, then directory name, then username,
/// then the raw id. Directory failures fall through silently.
pub async fn display_label(
    ctx: &ServiceContext,
    chat_id: Option<ChatId>,
    user_id: UserId,
    stored_name: Option<&str>,
) -> String {
    if let Some(name) = stored_name.filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    if let Ok(Some(name)) = ctx.directory().display_name(chat_id, user_id).await {
        return name;
    }
    if let Ok(Some(username)) = ctx.directory().username_of(user_id).await {
        return format!("@{username}");
    }
    user_id.to_string()
}

/// Linked label for a user, see [`display_label`]
pub async fn linked_user(ctx: &ServiceContext, chat_id: Option<ChatId>, user_id: UserId) -> String {
    let label = display_label(ctx, chat_id, user_id, None).await;
    user_link(user_id, &label)
}
