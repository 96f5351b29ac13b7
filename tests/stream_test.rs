mod common;

use notif_relay::models::{NotificationModel, SubscriptionModel, TokenModel};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;

#[tokio::test]
async fn missing_credentials_get_basic_challenge() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = common::spawn_app(db, 4).await;

    let resp = app.client.get(app.url("/")).send().await.unwrap();

    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["www-authenticate"], "Basic");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Cannot authenticate user");
    assert_eq!(app.pool.active_leases(), 0);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<TokenModel>::new()])
        .into_connection();
    let app = common::spawn_app(db, 4).await;

    let resp = app
        .client
        .get(app.url("/"))
        .basic_auth("expired-or-unknown", None::<&str>)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["www-authenticate"], "Basic");
    assert_eq!(app.pool.active_leases(), 0);
}

#[tokio::test]
async fn sub_resources_are_not_served() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = common::spawn_app(db, 4).await;

    let resp = app
        .client
        .get(app.url("/some/other/page"))
        .basic_auth("stream-token", None::<&str>)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn health_reports_open_streams() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = common::spawn_app(db, 4).await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["streams"], 0);
    assert_eq!(body["max_streams"], 4);
}

#[tokio::test]
async fn streams_enriched_notifications_and_skips_dropped_ones() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // credential lookup
        .append_query_results([vec![common::token(1)]])
        // first poll
        .append_query_results([vec![
            common::notification(500, 50, 1, 1),
            common::notification(501, 51, 1, 2),
        ]])
        // 500: activity on a document, dropped
        .append_query_results([vec![common::activity(50, "document", "commented", 2)]])
        // 501: Bob replied to a comment on Alice's post
        .append_query_results([vec![common::activity(51, "node", "replied", 2)]])
        .append_query_results([vec![common::node(20, "comment", Some(10), 2)]])
        .append_query_results([vec![common::node(10, "post", None, 3)]])
        .append_query_results([vec![common::user(3, "Alice")]])
        .append_query_results([Vec::<SubscriptionModel>::new()])
        .append_query_results([vec![common::user(2, "Bob")]])
        .into_connection();
    let app = common::spawn_app(db, 4).await;

    let mut resp = app
        .client
        .get(app.url("/"))
        .basic_auth("stream-token", None::<&str>)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    assert_eq!(resp.headers()["cache-control"], "no-cache");

    let frame = common::read_frame(&mut resp).await;
    let lines: Vec<&str> = frame.trim_end_matches('\n').split('\n').collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "id: 501");
    assert_eq!(lines[1], "event: notification");

    let data = lines[2].strip_prefix("data: ").expect("data line");
    let payload: Value = serde_json::from_str(data).unwrap();
    assert_eq!(payload["_id"], 501);
    assert_eq!(payload["username"], "Bob");
    assert_eq!(payload["username_avatar"], "https://avatars.test/bob@example.com");
    assert_eq!(payload["action"], "replied to");
    assert_eq!(payload["object_type"], "comment");
    assert_eq!(payload["object_url"], "/nodes/20/redir");
    assert_eq!(payload["context_object_type"], "post");
    assert_eq!(payload["context_object_name"], "Alice's post");
    assert_eq!(payload["context_object_url"], "/nodes/10/redir");
    assert_eq!(payload["is_subscribed"], false);
    assert_eq!(payload["subscription"], Value::Null);
    assert_eq!(payload["date"], "2024-06-01T08:00:00Z");
    assert_eq!(app.pool.active_leases(), 1);

    app.shutdown.cancel();
    app.wait_for_idle().await;
}

#[tokio::test]
async fn session_limit_answers_503() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::token(1)]])
        .append_query_results([Vec::<NotificationModel>::new()])
        .into_connection();
    let app = common::spawn_app(db, 1).await;

    let first = app
        .client
        .get(app.url("/"))
        .basic_auth("stream-token", None::<&str>)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = app
        .client
        .get(app.url("/"))
        .basic_auth("stream-token", None::<&str>)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 503);

    app.shutdown.cancel();
    app.wait_for_idle().await;
    drop(first);
}
