//! Staff listings, rank inspection, media mutes and the lost member sweep
//!
//! Run with: cargo test -p integration-tests --test staff_tests

use integration_tests::*;
use modbot_common::ModerationSettings;
use modbot_core::entities::ActionType;
use modbot_core::value_objects::{ChatPermissions, MemberStatus};

// ============================================================================
// /mods and /restrict
// ============================================================================

#[tokio::test]
async fn test_mods_groups_staff_by_level() {
    let bot = TestBot::with_group().await;
    bot.send(group_message(&OWNER, "/modlevel 2 @lee")).await.unwrap();

    bot.send(group_message(&MEMBER, "/mods")).await.unwrap();
    let text = bot.last_text(GROUP);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].ends_with("Mod Level 5:"));
    assert_eq!(lines[1], "🛡 Olga");
    assert!(lines[2].ends_with("Mod Level 3:"));
    assert_eq!(lines[3], "🛡 Ida");
    assert_eq!(lines[4], "🛡 Max Mod");
    assert!(lines[5].ends_with("Mod Level 2:"));
    assert_eq!(lines[6], "Lee");
}

#[tokio::test]
async fn test_mods_orders_groups_by_rank_priority() {
    let bot = TestBot::with_group().await;
    bot.send(group_message(&OWNER, "/addmodrank Helper 2")).await.unwrap();
    bot.send(group_message(&OWNER, "/modlevel 6 @lee")).await.unwrap();
    bot.send(group_message(&OWNER, "/modedit 3 Moderator")).await.unwrap();

    bot.send(group_message(&MEMBER, "/mods")).await.unwrap();
    let text = bot.last_text(GROUP);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "⭐️⭐️⭐️⭐️⭐️ Mod Level 5:",
            "🛡 Olga",
            "⭐️⭐️⭐️ Moderator (level 3):",
            "🛡 Ida",
            "🛡 Max Mod",
            "⭐️⭐️ Helper (level 6):",
            "Lee",
        ]
    );
}

#[tokio::test]
async fn test_mods_mention_flag() {
    let bot = TestBot::with_group().await;

    bot.send(group_message(&MEMBER, "/mods mention=on")).await.unwrap();
    assert!(bot
        .last_text(GROUP)
        .contains(r#"🛡 <a href="tg://user?id=10">Olga</a>"#));

    bot.send(group_message(&MEMBER, "/mods mention=maybe")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "❌ The mention argument accepts 'on' or 'off'."
    );
}

#[tokio::test]
async fn test_mention_default_comes_from_settings() {
    let bot = TestBot::with_settings(ModerationSettings {
        mention_default: true,
        ..ModerationSettings::default()
    });
    bot.gateway
        .set_member(GROUP, OWNER.user_id(), MemberStatus::Creator, "Olga");

    bot.send(group_message(&MEMBER, "/mods")).await.unwrap();
    assert!(bot.last_text(GROUP).contains(r#"<a href="tg://user?id=10">"#));
}

#[tokio::test]
async fn test_restrict_lists_exact_level() {
    let bot = TestBot::with_group().await;

    bot.send(group_message(&MEMBER, "/restrict 3")).await.unwrap();
    let text = bot.last_text(GROUP);
    assert!(text.ends_with("Level 3 members:\n🛡 Ida\n🛡 Max Mod"));

    bot.send(group_message(&MEMBER, "/restrict 4")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ Nobody currently has level 4.");

    bot.send(group_message(&MEMBER, "/restrict 9")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "❌ Level must be a number between 0 and 5."
    );
}

// ============================================================================
// Rank inspection
// ============================================================================

#[tokio::test]
async fn test_rankinfo_and_rename() {
    let bot = TestBot::with_group().await;

    bot.send(group_message(&ADMIN, "/rankinfo")).await.unwrap();
    let text = bot.last_text(GROUP);
    assert!(text.starts_with("<b>Ranks</b>"));
    assert!(text.contains("#5 Level 5 - level 5, priority 5"));
    assert!(text.ends_with("#0 Member - level 0, priority 0"));

    bot.send(group_message(&OWNER, "/modlevel 2 @lee")).await.unwrap();
    bot.send(group_message(&OWNER, "/modedit 2 Helper")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), r#"✅ Rank #2 is now called "Helper"."#);

    bot.send(group_message(&ADMIN, "/rankinfo 2")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "<b>Rank #2: Helper</b>\nLevel: 2\nPriority: 2\n<i>Default rank</i>\nMembers (1):\n• <a href=\"tg://user?id=40\">Lee</a>"
    );

    // Renaming is a level 5 command
    bot.send(group_message(&ADMIN, "/modedit 2 Trainee")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ Only level 5+ members can use /modedit.");

    bot.send(group_message(&ADMIN, "/rankinfo 42")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "❌ Rank 42 does not exist.");
}

// ============================================================================
// Media mutes
// ============================================================================

#[tokio::test]
async fn test_mediamute_and_lift() {
    let bot = TestBot::with_group().await;

    bot.send(group_message(&ADMIN, "/mediamute @lee 30m stickers"))
        .await
        .unwrap();
    assert!(bot.last_text(GROUP).starts_with("🔇 <b>Media Muted</b>"));
    assert_eq!(bot.gateway.restrictions()[0].permissions, ChatPermissions::TEXT_ONLY);

    bot.send(group_message(&ADMIN, "/mutelist")).await.unwrap();
    let text = bot.last_text(GROUP);
    assert!(text.contains("[media]"));
    assert!(text.contains("reason: stickers"));

    bot.send(group_message(&ADMIN, "/unmediamute @lee")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        r#"🔊 Media restrictions lifted for <a href="tg://user?id=40">Lee</a>."#
    );
    let restrictions = bot.gateway.restrictions();
    assert_eq!(restrictions.len(), 2);
    assert_eq!(restrictions[1].permissions, ChatPermissions::ALL_MESSAGES);
    assert_eq!(restrictions[1].until, None);

    let actions = bot.store.actions();
    let mediamute = actions
        .iter()
        .find(|a| a.action_type == ActionType::MediaMute)
        .unwrap();
    assert!(!mediamute.active);

    bot.send(group_message(&ADMIN, "/mutelist")).await.unwrap();
    assert_eq!(bot.last_text(GROUP), "No users are currently muted.");
}

#[tokio::test]
async fn test_unmute_restores_permissions() {
    let bot = TestBot::with_group().await;

    bot.send(group_message(&ADMIN, "/мут @spammer 1h")).await.unwrap();
    bot.send(group_message(&ADMIN, "/unmute @spammer")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        r#"🔊 User <a href="tg://user?id=30">Spam Bot</a> has been unmuted."#
    );

    let restrictions = bot.gateway.restrictions();
    assert_eq!(restrictions[0].permissions, ChatPermissions::MUTED);
    assert_eq!(restrictions[1].permissions, ChatPermissions::ALL_MESSAGES);
    assert!(bot
        .store
        .actions()
        .iter()
        .all(|a| !a.active));
}

// ============================================================================
// Lost members
// ============================================================================

#[tokio::test]
async fn test_lostmembers_reports_and_purges() {
    let bot = TestBot::with_group().await;
    bot.send(group_message(&OWNER, "/modlevel 1 @spammer")).await.unwrap();

    bot.send(group_message(&OWNER, "/lostmembers")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "✅ No lost members found among 5 known users."
    );

    bot.gateway
        .set_member(GROUP, SPAMMER.user_id(), MemberStatus::Left, "Spam Bot");

    bot.send(group_message(&OWNER, "/lostmembers")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "<b>Lost members (1):</b>\n• <a href=\"tg://user?id=30\">Spam Bot</a>\n\nSend /lostmembers purge to remove them from the records."
    );
    assert_eq!(bot.store.level_of(GROUP, SPAMMER.user_id()), Some(1));

    bot.send(group_message(&OWNER, "/lostmembers purge")).await.unwrap();
    assert!(bot
        .last_text(GROUP)
        .ends_with("🧹 Removed 1 lost members from the records."));
    assert_eq!(bot.store.level_of(GROUP, SPAMMER.user_id()), None);

    bot.send(group_message(&OWNER, "/lostmembers")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "✅ No lost members found among 4 known users."
    );
}

#[tokio::test]
async fn test_lostmembers_requires_level_three() {
    let bot = TestBot::with_group().await;
    bot.send(group_message(&OWNER, "/modlevel 2 @lee")).await.unwrap();

    bot.send(group_message(&MEMBER, "/lostmembers")).await.unwrap();
    assert_eq!(
        bot.last_text(GROUP),
        "❌ Only level 3+ members can use /lostmembers."
    );
}
