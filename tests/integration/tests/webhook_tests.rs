//! Webhook endpoint tests
//!
//! Run with: cargo test -p integration-tests --test webhook_tests

use integration_tests::*;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let bot = TestBot::with_group().await;
    let server = TestServer::start(bot.dispatcher()).await.unwrap();

    let response = server.get("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_webhook_accepts_and_processes_command() {
    let bot = TestBot::with_group().await;
    let server = TestServer::start(bot.dispatcher()).await.unwrap();

    let response = server
        .post_json("/webhook", &group_message_json(&OWNER, "/ban @spammer 2h flood"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(eventually(|| bot.gateway.bans().len() == 1).await);
    assert_eq!(bot.gateway.bans()[0].user_id, SPAMMER.user_id());
    assert!(eventually(|| !bot.store.actions().is_empty()).await);
}

#[tokio::test]
async fn test_webhook_acknowledges_unclaimed_updates() {
    let bot = TestBot::with_group().await;
    let server = TestServer::start(bot.dispatcher()).await.unwrap();

    let chatter = server
        .post_json("/webhook", &group_message_json(&MEMBER, "hello everyone"))
        .await
        .unwrap();
    assert_eq!(chatter.status(), StatusCode::OK);

    let unknown = server
        .post_json("/webhook", &json!({"update_id": next_id(), "edited_channel_post": {}}))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::OK);

    // Neither update gets a reply
    assert!(bot.gateway.sent().is_empty());
}

#[tokio::test]
async fn test_webhook_rejects_malformed_body() {
    let bot = TestBot::new();
    let server = TestServer::start(bot.dispatcher()).await.unwrap();

    let response = server
        .client
        .post(server.url("/webhook"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = server.get("/webhook").await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
