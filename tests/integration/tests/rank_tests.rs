//! Rank seeding, level resolution and priority comparisons against the store
//!
//! Run with: cargo test -p integration-tests --test rank_tests

use integration_tests::*;
use modbot_core::{ModeratorRank, RankRepository};
use modbot_service::{ErrorKind, LevelResolver, PermissionChecker, RankRegistry};

fn sorted_ranks(bot: &TestBot) -> Vec<ModeratorRank> {
    let mut ranks = bot.store.ranks(GROUP);
    ranks.sort_by_key(|r| r.level);
    ranks
}

// ============================================================================
// Default ranks
// ============================================================================

#[tokio::test]
async fn test_ensure_defaults_is_idempotent() {
    let bot = TestBot::with_group().await;
    let registry = RankRegistry::new(bot.context());

    registry.ensure_defaults(GROUP).await.unwrap();
    let first = sorted_ranks(&bot);
    assert_eq!(first.len(), 6);
    for (level, rank) in first.iter().enumerate() {
        assert_eq!(rank.level, level as i32);
        assert_eq!(rank.id, level as i64);
        assert_eq!(rank.priority, level as i32);
        assert_eq!(rank.name, ModeratorRank::default_name(rank.level));
    }

    registry.ensure_defaults(GROUP).await.unwrap();
    assert_eq!(sorted_ranks(&bot), first);
}

#[tokio::test]
async fn test_ensure_defaults_rekeys_legacy_rows() {
    let bot = TestBot::with_group().await;
    RankRepository::replace_at_level(
        &*bot.store,
        &ModeratorRank {
            id: 9,
            chat_id: GROUP,
            name: "Veteran".into(),
            level: 3,
            priority: 4,
        },
    )
    .await
    .unwrap();

    let registry = RankRegistry::new(bot.context());
    registry.ensure_defaults(GROUP).await.unwrap();
    registry.ensure_defaults(GROUP).await.unwrap();

    let ranks = sorted_ranks(&bot);
    assert_eq!(ranks.len(), 6);
    assert!(ranks.iter().all(|r| r.id != 9));
    let veteran = &ranks[3];
    assert_eq!(veteran.id, 3);
    assert_eq!(veteran.name, "Veteran");
    assert_eq!(veteran.priority, 4);
}

// ============================================================================
// Level resolution
// ============================================================================

#[tokio::test]
async fn test_effective_level_prefers_stored_override() {
    let bot = TestBot::with_group().await;
    let resolver = LevelResolver::new(bot.context());

    assert_eq!(resolver.effective_level(GROUP, OWNER.user_id()).await.unwrap(), 5);
    assert_eq!(resolver.effective_level(GROUP, ADMIN.user_id()).await.unwrap(), 3);
    assert_eq!(resolver.effective_level(GROUP, MEMBER.user_id()).await.unwrap(), 0);

    bot.send(group_message(&OWNER, "/modlevel 2 @lee")).await.unwrap();
    assert_eq!(resolver.effective_level(GROUP, MEMBER.user_id()).await.unwrap(), 2);
    let rank = resolver.effective_rank(GROUP, MEMBER.user_id()).await.unwrap();
    assert_eq!((rank.id, rank.priority), (2, 2));

    // Clearing the override falls back to membership status
    bot.send(group_message(&OWNER, "/modlevel 0 @lee")).await.unwrap();
    assert_eq!(bot.store.level_of(GROUP, MEMBER.user_id()), None);
    assert_eq!(resolver.effective_level(GROUP, MEMBER.user_id()).await.unwrap(), 0);
    assert_eq!(resolver.effective_priority(GROUP, MEMBER.user_id()).await.unwrap(), 0);
}

// ============================================================================
// Priority comparisons
// ============================================================================

#[tokio::test]
async fn test_can_moderate_compares_priority_not_level() {
    let bot = TestBot::with_group().await;
    bot.send(group_message(&OWNER, "/addmodrank Junior 2")).await.unwrap();
    bot.send(group_message(&OWNER, "/modlevel 6 @lee")).await.unwrap();

    let checker = PermissionChecker::new(bot.context());
    checker
        .can_moderate(GROUP, ADMIN.user_id(), MEMBER.user_id())
        .await
        .unwrap();
    let err = checker
        .can_moderate(GROUP, MEMBER.user_id(), ADMIN.user_id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TargetOutranks);

    // Equal priority is not enough
    let err = checker
        .can_moderate(GROUP, ADMIN.user_id(), CO_ADMIN.user_id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TargetOutranks);

    let err = checker
        .can_moderate(GROUP, SPAMMER.user_id(), MEMBER.user_id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientAuthority);
}
