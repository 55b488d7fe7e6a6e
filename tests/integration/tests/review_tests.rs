//! Reports, appeals, the private review menu and moderator logs
//!
//! Run with: cargo test -p integration-tests --test review_tests

use chrono::{Duration, Utc};
use integration_tests::*;
use modbot_core::entities::{ActionType, EntryStatus, NewAction, NewReport};
use modbot_core::traits::{ButtonAction, InlineKeyboard};
use modbot_core::{ActionRepository, ReportRepository};
use modbot_gateway::Handled;

fn callbacks(keyboard: &InlineKeyboard) -> Vec<String> {
    keyboard
        .buttons()
        .filter_map(|b| match &b.action {
            ButtonAction::Callback(data) => Some(data.clone()),
            ButtonAction::Url(_) => None,
        })
        .collect()
}

fn labels(keyboard: &InlineKeyboard) -> Vec<String> {
    keyboard.buttons().map(|b| b.text.clone()).collect()
}

async fn seed_reports(bot: &TestBot, count: i64) {
    let now = Utc::now();
    for n in 0..count {
        ReportRepository::insert(
            &*bot.store,
            &NewReport {
                chat_id: GROUP,
                chat_title: Some(GROUP_TITLE.to_string()),
                chat_username: Some("rustchat".to_string()),
                message_id: 500 + n,
                reporter_id: MEMBER.user_id(),
                target_user_id: Some(SPAMMER.user_id()),
                target_user_name: Some(SPAMMER.full_name()),
                message_text: Some(format!("spam message {n}")),
                has_photo: false,
                has_video: false,
            },
            now - Duration::minutes(count - n),
        )
        .await
        .unwrap();
    }
}

// ============================================================================
// Submitting
// ============================================================================

#[tokio::test]
async fn test_report_is_stored_with_message_context() {
    let bot = TestBot::with_group().await;

    let result = bot
        .send(group_reply(&MEMBER, "/report", &SPAMMER, "buy cheap coins"))
        .await;
    assert!(matches!(result, Ok(Handled::Html(_))));
    assert_eq!(
        bot.last_text(GROUP),
        "✅ Report submitted. Moderators will review it in their direct messages."
    );

    let reports = bot.store.reports();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.chat_id, GROUP);
    assert_eq!(report.chat_title.as_deref(), Some(GROUP_TITLE));
    assert_eq!(report.reporter_id, MEMBER.user_id());
    assert_eq!(report.target_user_id, Some(SPAMMER.user_id()));
    assert_eq!(report.message_text.as_deref(), Some("buy cheap coins"));
    assert_eq!(report.status, EntryStatus::Open);
}

#[tokio::test]
async fn test_report_rejections() {
    let bot = TestBot::with_group().await;

    bot.send(report_of_bot_message(&MEMBER)).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ You cannot report bot messages.");

    bot.send(group_message(&MEMBER, "/report")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ Reply to the message you want to report.");

    bot.send(private_message(&MEMBER, "/report")).await.unwrap();
    assert_eq!(
        bot.last_text(MEMBER.dm()),
        "❌ You can only use this command in group chats."
    );

    assert!(bot.store.reports().is_empty());
}

// ============================================================================
// Review menu
// ============================================================================

#[tokio::test]
async fn test_review_select_and_close() {
    let bot = TestBot::with_group().await;
    bot.send(group_reply(&MEMBER, "/report", &SPAMMER, "buy cheap coins"))
        .await
        .unwrap();
    let report_id = bot.store.reports()[0].id;

    // Overview
    let result = bot.send(private_message(&ADMIN, "/reports")).await;
    assert!(matches!(result, Ok(Handled::Done)));
    let (overview_ref, overview) = bot.last_message_ref(ADMIN.dm());
    assert!(overview.html);
    assert!(overview.text.starts_with("<b>Reports:</b>\n1. Rustaceans: buy cheap coins"));
    assert!(overview.text.contains("Send the number of an entry to view full details."));
    assert_eq!(callbacks(overview.keyboard.as_ref().unwrap()), vec!["reports:exit"]);

    // Selection
    bot.send(private_message(&ADMIN, "1")).await.unwrap();
    let (detail_ref, detail) = bot.last_message_ref(ADMIN.dm());
    assert_ne!(detail_ref, overview_ref);
    assert!(detail.text.contains("buy cheap coins"));
    assert!(detail.text.contains("Status: open"));
    let keyboard = detail.keyboard.unwrap();
    let close = format!("reports:close:report:{report_id}");
    assert_eq!(callbacks(&keyboard), vec![close.clone()]);
    assert!(keyboard
        .buttons()
        .any(|b| matches!(&b.action, ButtonAction::Url(url) if url.contains("rustchat"))));

    // Close
    bot.send(callback(&ADMIN, detail_ref, &close)).await.unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("Report closed."));

    let report = bot.store.reports().pop().unwrap();
    assert_eq!(report.status, EntryStatus::Closed);
    assert_eq!(report.closed_by_user_id, Some(ADMIN.user_id()));
    assert_eq!(report.closed_by_user_name.as_deref(), Some("Max Mod"));

    let edits = bot.gateway.edits();
    let detail_edit = edits.iter().find(|e| e.target == detail_ref).unwrap();
    assert!(detail_edit.text.contains("Closed by: "));
    assert_eq!(
        callbacks(detail_edit.keyboard.as_ref().unwrap()),
        vec![format!("reports:reopen:report:{report_id}")]
    );
    let overview_edit = edits.iter().find(|e| e.target == overview_ref).unwrap();
    assert_eq!(overview_edit.text, "There are no pending reports or appeals right now.");

    // A second close keeps the first closer and renders the same detail
    let first_render = detail_edit.clone();
    bot.send(callback(&CO_ADMIN, detail_ref, &close)).await.unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("Report already closed."));
    let report = bot.store.reports().pop().unwrap();
    assert_eq!(report.status, EntryStatus::Closed);
    assert_eq!(report.closed_by_user_id, Some(ADMIN.user_id()));
    assert_eq!(report.closed_by_user_name.as_deref(), Some("Max Mod"));
    let second_render = bot
        .gateway
        .edits()
        .into_iter()
        .filter(|e| e.target == detail_ref)
        .last()
        .unwrap();
    assert_eq!(second_render.text, first_render.text);
    assert_eq!(second_render.keyboard, first_render.keyboard);

    // Members may not touch the entry
    bot.send(callback(&MEMBER, detail_ref, &format!("reports:reopen:report:{report_id}")))
        .await
        .unwrap();
    assert_eq!(
        bot.last_answer().as_deref(),
        Some("❌ You are not a moderator in any tracked chats.")
    );
    assert_eq!(bot.store.reports()[0].status, EntryStatus::Closed);
}

#[tokio::test]
async fn test_review_requires_private_chat_and_moderator() {
    let bot = TestBot::with_group().await;
    seed_reports(&bot, 1).await;

    bot.send(group_message(&ADMIN, "/reports")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "❌ Use this command in a private chat with the bot."
    );

    bot.send(private_message(&MEMBER, "/reports")).await.unwrap();
    assert_eq!(
        bot.last_text(MEMBER.dm()),
        "❌ You are not a moderator in any tracked chats."
    );
}

#[tokio::test]
async fn test_review_pagination() {
    let bot = TestBot::with_group().await;
    seed_reports(&bot, 12).await;

    bot.send(private_message(&ADMIN, "/reports")).await.unwrap();
    let (overview_ref, overview) = bot.last_message_ref(ADMIN.dm());
    assert!(overview.text.contains("\n10. "));
    assert!(!overview.text.contains("\n11. "));

    let keyboard = overview.keyboard.unwrap();
    assert_eq!(
        callbacks(&keyboard),
        vec!["reports:page:0", "reports:page:1", "reports:exit"]
    );
    assert_eq!(&labels(&keyboard)[..2], ["[1]", "2"]);

    bot.send(callback(&ADMIN, overview_ref, "reports:page:1"))
        .await
        .unwrap();
    let edits = bot.gateway.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].target, overview_ref);
    assert!(edits[0].text.contains("11. "));
    assert!(edits[0].text.contains("12. "));
    assert!(!edits[0].text.contains("\n1. "));
    assert_eq!(&labels(edits[0].keyboard.as_ref().unwrap())[..2], ["1", "[2]"]);

    // The current page is not redrawn
    bot.send(callback(&ADMIN, overview_ref, "reports:page:1"))
        .await
        .unwrap();
    assert_eq!(bot.gateway.edits().len(), 1);

    // Entries are numbered across pages
    bot.send(private_message(&ADMIN, "12")).await.unwrap();
    let detail = bot.last_message(ADMIN.dm());
    assert!(detail.html);
    assert!(detail.keyboard.is_some());

    bot.send(private_message(&ADMIN, "13")).await.unwrap();
    assert_eq!(
        bot.last_text(ADMIN.dm()),
        "The selected number is outside of the available range."
    );
    bot.send(private_message(&ADMIN, "first")).await.unwrap();
    assert_eq!(
        bot.last_text(ADMIN.dm()),
        "Please send the number from the list to view the entry."
    );
}

#[tokio::test]
async fn test_menu_ends_the_review_session() {
    let bot = TestBot::with_group().await;
    seed_reports(&bot, 2).await;

    bot.send(private_message(&ADMIN, "/reports")).await.unwrap();
    bot.send(private_message(&ADMIN, "/menu")).await.unwrap();
    assert_eq!(
        bot.last_text(ADMIN.dm()),
        "🏠 You're back in the main menu. Use /help to see available commands."
    );

    // Plain text is no longer a selection
    let sent_before = bot.gateway.sent().len();
    let result = bot.send(private_message(&ADMIN, "1")).await;
    assert!(result.is_err());
    assert_eq!(bot.gateway.sent().len(), sent_before);
}

#[tokio::test]
async fn test_exit_button_answers_and_confirms() {
    let bot = TestBot::with_group().await;
    seed_reports(&bot, 1).await;

    bot.send(private_message(&ADMIN, "/reports")).await.unwrap();
    let (overview_ref, _) = bot.last_message_ref(ADMIN.dm());

    bot.send(callback(&ADMIN, overview_ref, "reports:exit"))
        .await
        .unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("Reports menu closed."));
    assert_eq!(
        bot.last_text(ADMIN.dm()),
        "🏠 You're back in the main menu. Use /help to see available commands."
    );
}

// ============================================================================
// Appeals
// ============================================================================

#[tokio::test]
async fn test_appeal_flow() {
    let bot = TestBot::with_group().await;
    bot.send(group_message(&OWNER, "/ban @spammer 7d spam")).await.unwrap();

    bot.send(group_message(&SPAMMER, "/appeal")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ Send appeals to the bot in a private chat.");

    bot.send(private_message(&SPAMMER, "/appeal")).await.unwrap();
    assert_eq!(
        bot.last_text(SPAMMER.dm()),
        "Please describe why you believe the punishment was a mistake."
    );

    bot.send(private_message(&SPAMMER, "   ")).await.unwrap();
    assert_eq!(
        bot.last_text(SPAMMER.dm()),
        "Please send a text description for your appeal."
    );

    bot.send(private_message(&SPAMMER, "It was a <joke>, I promise"))
        .await
        .unwrap();
    assert!(bot.last_text(SPAMMER.dm()).starts_with("✅ Your appeal has been submitted."));

    let appeals = bot.store.appeals();
    assert_eq!(appeals.len(), 1);
    assert_eq!(appeals[0].user_id, SPAMMER.user_id());
    assert_eq!(appeals[0].description, "It was a <joke>, I promise");

    // Moderators see it under its own header
    bot.send(private_message(&ADMIN, "/reports")).await.unwrap();
    let overview = bot.last_text(ADMIN.dm());
    assert!(overview.starts_with("<b>Appeals:</b>\n1. "));
    assert!(overview.contains("It was a &lt;joke&gt;, I promise"));

    bot.send(private_message(&ADMIN, "1")).await.unwrap();
    let (detail_ref, detail) = bot.last_message_ref(ADMIN.dm());
    assert!(detail.text.starts_with(&format!("<b>Appeal #{}</b>", appeals[0].id)));

    let close = format!("reports:close:appeal:{}", appeals[0].id);
    bot.send(callback(&ADMIN, detail_ref, &close)).await.unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("Appeal closed."));
    bot.send(callback(&ADMIN, detail_ref, &close)).await.unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("Appeal already closed."));
    assert_eq!(bot.store.appeals()[0].status, EntryStatus::Closed);

    bot.send(callback(&ADMIN, detail_ref, &format!("reports:reopen:appeal:{}", appeals[0].id)))
        .await
        .unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("Entry reopened."));
    assert_eq!(bot.store.appeals()[0].status, EntryStatus::Open);
}

// ============================================================================
// Moderator logs
// ============================================================================

#[tokio::test]
async fn test_modlogs_pages_belong_to_their_requester() {
    let bot = TestBot::with_group().await;
    let now = Utc::now();
    for minute in 0..8 {
        ActionRepository::insert(
            &*bot.store,
            &NewAction::history(
                ActionType::Warn,
                GROUP,
                SPAMMER.user_id(),
                ADMIN.user_id(),
                Some(format!("warning {minute}")),
            ),
            now - Duration::minutes(60 - minute),
            None,
        )
        .await
        .unwrap();
    }

    bot.send(group_message(&OWNER, "/modlogs")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ This command works only in private messages.");

    bot.send(private_message(&ADMIN, "/modlogs")).await.unwrap();
    assert_eq!(
        bot.last_text(ADMIN.dm()),
        "❌ Only level 5 moderators can view the moderation logs."
    );

    let result = bot.send(private_message(&OWNER, "/modlogs")).await;
    assert!(matches!(result, Ok(Handled::Done)));
    let (page_ref, page) = bot.last_message_ref(OWNER.dm());
    assert!(page.text.starts_with("<b>Moderator actions</b>\n<i>Page 1</i>"));
    assert!(page.text.contains("warning 7"));
    assert!(page.text.contains("\n6. "));
    assert!(!page.text.contains("\n7. "));
    assert_eq!(callbacks(page.keyboard.as_ref().unwrap()), vec!["modlogs:10:1"]);

    bot.send(callback(&ADMIN, page_ref, "modlogs:10:1")).await.unwrap();
    assert_eq!(
        bot.last_answer().as_deref(),
        Some("This menu belongs to another moderator.")
    );
    assert!(bot.gateway.edits().is_empty());

    bot.send(callback(&OWNER, page_ref, "modlogs:10:1")).await.unwrap();
    assert_eq!(bot.last_answer(), None);
    let edits = bot.gateway.edits();
    assert_eq!(edits.len(), 1);
    assert!(edits[0].text.contains("<i>Page 2</i>"));
    assert!(edits[0].text.contains("\n7. "));
    assert!(edits[0].text.contains("warning 0"));
    assert_eq!(
        callbacks(edits[0].keyboard.as_ref().unwrap()),
        vec!["modlogs:10:0"]
    );

    bot.send(callback(&OWNER, page_ref, "modlogs:10:5")).await.unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("No more entries on this page."));

    // Forged page numbers past the addressable range get the same answer
    bot.send(callback(&OWNER, page_ref, "modlogs:10:9223372036854775807"))
        .await
        .unwrap();
    assert_eq!(bot.last_answer().as_deref(), Some("No more entries on this page."));
    assert_eq!(bot.gateway.edits().len(), 1);
}

#[tokio::test]
async fn test_modlogs_single_page_has_no_keyboard() {
    let bot = TestBot::with_group().await;
    ActionRepository::insert(
        &*bot.store,
        &NewAction::history(
            ActionType::Warn,
            GROUP,
            SPAMMER.user_id(),
            ADMIN.user_id(),
            Some("only warning".into()),
        ),
        Utc::now(),
        None,
    )
    .await
    .unwrap();

    bot.send(private_message(&OWNER, "/modlogs")).await.unwrap();
    let (_, page) = bot.last_message_ref(OWNER.dm());
    assert!(page.text.contains("only warning"));
    assert!(page.keyboard.is_none());
}

// ============================================================================
// Report history
// ============================================================================

#[tokio::test]
async fn test_report_history_pages() {
    let bot = TestBot::with_group().await;

    bot.send(private_message(&ADMIN, "/reporthistory")).await.unwrap();
    assert_eq!(
        bot.last_text(ADMIN.dm()),
        "❌ You are not a moderator in any tracked chats."
    );

    seed_reports(&bot, 12).await;
    let newest = bot
        .store
        .reports()
        .into_iter()
        .find(|r| r.message_id == 511)
        .unwrap();
    ReportRepository::update_status(
        &*bot.store,
        newest.id,
        EntryStatus::Closed,
        Some((CO_ADMIN.user_id(), "Ida")),
    )
    .await
    .unwrap();

    bot.send(private_message(&ADMIN, "/reporthistory")).await.unwrap();
    let text = bot.last_text(ADMIN.dm());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "<b>Report history, page 1</b>");
    assert_eq!(
        lines[1],
        r#"1. [CLOSED] <a href="https://t.me/rustchat/511">Rustaceans</a>: spam message 11"#
    );
    assert!(lines[2].starts_with(r#"<i>Reporter:</i> <a href="tg://user?id=40">Lee</a>"#));
    assert_eq!(lines[3], r#"<i>Closed by:</i> <a href="tg://user?id=21">Ida</a>"#);
    assert!(lines[4].starts_with("2. [OPEN]"));
    assert!(text.ends_with("Use /reporthistory 2 for the next page."));

    bot.send(private_message(&ADMIN, "/reporthistory 2")).await.unwrap();
    let text = bot.last_text(ADMIN.dm());
    assert!(text.starts_with("<b>Report history, page 2</b>\n11. [OPEN]"));
    assert!(text.contains("12. [OPEN]"));
    assert!(text.ends_with("Use /reporthistory 1 for the previous page."));

    bot.send(private_message(&ADMIN, "/reporthistory 3")).await.unwrap();
    assert_eq!(bot.last_text(ADMIN.dm()), "No reports were found for this page.");

    bot.send(private_message(&ADMIN, "/reporthistory 9223372036854775807"))
        .await
        .unwrap();
    assert_eq!(bot.last_text(ADMIN.dm()), "No reports were found for this page.");

    bot.send(group_message(&ADMIN, "/reporthistory")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "❌ Use this command in a private chat with the bot."
    );
}
