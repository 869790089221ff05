//! Integration tests for the client-side sync flow against a mock backend.
//!
//! Each test starts its own wiremock server, drives `App` through the public
//! `sync` operations and pumps task results back in with `handle_app_event`,
//! the same way the event loop does. Request counts are checked by the mock
//! expectations when the server drops.

use cognos::api::{ApiClient, FetchResult, DEFAULT_TIMEOUT};
use cognos::app::{App, AppEvent, Phase};
use cognos::config::Config;
use cognos::sync::{self, handle_app_event};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUMP_TIMEOUT: Duration = Duration::from_secs(5);

fn test_config() -> Config {
    Config {
        refresh_reload_delay_ms: 50,
        ..Config::default()
    }
}

fn new_app(server: &MockServer) -> App {
    let client = ApiClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
    App::new(client, &test_config())
}

/// Apply task results until `done` holds.
async fn pump_until<F>(
    app: &mut App,
    rx: &mut mpsc::Receiver<AppEvent>,
    tx: &mpsc::Sender<AppEvent>,
    mut done: F,
) where
    F: FnMut(&App) -> bool,
{
    timeout(PUMP_TIMEOUT, async move {
        while !done(app) {
            let event = rx.recv().await.expect("event channel closed");
            handle_app_event(app, event, tx);
        }
    })
    .await
    .expect("condition not reached in time");
}

fn article_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "source": "Wire",
        "description": "summary",
        "published_at": "2024-03-05T10:00:00",
        "relevance_score": 0.8,
        "url": format!("https://example.com/{}", id)
    })
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "email": "ada@example.com", "name": "Ada"}])),
        )
        .mount(server)
        .await;
}

async fn mount_tags(server: &MockServer, tags: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags))
        .mount(server)
        .await;
}

fn two_tags() -> serde_json::Value {
    json!([
        {"id": 1, "user_id": 1, "tag_name": "AI", "keywords": ["ml"], "category": "tech"},
        {"id": 2, "user_id": 1, "tag_name": "Climate", "keywords": [], "category": null}
    ])
}

/// Bootstrap `app` to `Ready` with the first tag's articles loaded.
async fn bootstrap(
    app: &mut App,
    rx: &mut mpsc::Receiver<AppEvent>,
    tx: &mpsc::Sender<AppEvent>,
) {
    sync::start_bootstrap(app, tx);
    pump_until(app, rx, tx, |a| a.phase == Phase::Ready && !a.feed.loading).await;
}

#[tokio::test]
async fn test_bootstrap_selects_first_tag_and_loads_once() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([article_json(10, "Robots")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags/2/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    assert_eq!(app.user.as_ref().map(|u| u.id), Some(1));
    assert_eq!(app.selected_tag_id, Some(1));
    assert_eq!(app.feed.articles.len(), 1);
    assert_eq!(app.feed.articles[0].title, "Robots");
    assert!(app.feed.error.is_none());

    // Re-selecting the current tag does not issue another load.
    sync::select_tag(&mut app, Some(1), &tx);
    assert!(!app.feed.loading);
}

#[tokio::test]
async fn test_no_users_stops_bootstrap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    sync::start_bootstrap(&mut app, &tx);
    pump_until(&mut app, &mut rx, &tx, |a| a.phase != Phase::Bootstrapping).await;

    assert_eq!(app.phase, Phase::NoUser);
    assert!(app.user.is_none());
}

#[tokio::test]
async fn test_empty_tag_list_issues_no_article_request() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/tags/\d+/articles$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    assert!(app.tags.is_empty());
    assert!(app.selected_tag_id.is_none());
    assert!(app.feed.tag_id().is_none());
}

#[tokio::test]
async fn test_bootstrap_tag_failure_is_terminal() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    sync::start_bootstrap(&mut app, &tx);
    pump_until(&mut app, &mut rx, &tx, |a| a.phase != Phase::Bootstrapping).await;

    assert_eq!(
        app.phase,
        Phase::Failed("Failed to load tags: db down".to_string())
    );
}

#[tokio::test]
async fn test_stale_article_load_is_never_applied() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([article_json(10, "Slow AI story")]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags/2/articles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([article_json(20, "Glaciers")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    sync::start_bootstrap(&mut app, &tx);
    pump_until(&mut app, &mut rx, &tx, |a| a.phase == Phase::Ready).await;
    assert!(app.feed.loading);

    // Switch while tag 1's load is still in flight.
    sync::select_tag(&mut app, Some(2), &tx);
    pump_until(&mut app, &mut rx, &tx, |a| !a.feed.loading).await;
    assert_eq!(app.feed.tag_id(), Some(2));
    assert_eq!(app.feed.articles[0].title, "Glaciers");

    let late = timeout(PUMP_TIMEOUT, rx.recv())
        .await
        .expect("late response never arrived")
        .expect("event channel closed");
    match &late {
        AppEvent::ArticlesLoaded { ticket, .. } => assert_eq!(ticket.tag_id, 1),
        other => panic!("unexpected event: {:?}", other),
    }
    handle_app_event(&mut app, late, &tx);

    assert_eq!(app.feed.articles.len(), 1);
    assert_eq!(app.feed.articles[0].title, "Glaciers");
}

#[tokio::test]
async fn test_same_tag_loads_same_articles() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            article_json(10, "One"),
            article_json(11, "Two")
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;
    let first = app.feed.articles.clone();

    sync::reload_articles(&mut app, &tx);
    assert!(app.feed.loading);
    pump_until(&mut app, &mut rx, &tx, |a| !a.feed.loading).await;

    assert_eq!(app.feed.articles, first);
}

#[tokio::test]
async fn test_fetch_news_stores_result_and_reloads_once() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([article_json(10, "Robots")])),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags/1/fetch-news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag": "AI",
            "fetched": 40,
            "new_articles": 12,
            "matched_articles": 5,
            "threshold": 0.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    sync::refresh_news(&mut app, &tx);
    assert!(app.feed.fetching);
    // A second trigger while the first is running is ignored.
    sync::refresh_news(&mut app, &tx);

    pump_until(&mut app, &mut rx, &tx, |a| a.feed.fetch_result.is_some()).await;
    assert!(!app.feed.fetching);
    assert_eq!(
        app.feed.fetch_result,
        Some(FetchResult {
            tag: Some("AI".to_string()),
            fetched: 40,
            new_articles: 12,
            matched_articles: 5,
            threshold: 0.5,
        })
    );

    // The settle delay elapses, then exactly one reload runs.
    pump_until(&mut app, &mut rx, &tx, |a| a.feed.loading).await;
    pump_until(&mut app, &mut rx, &tx, |a| !a.feed.loading).await;
    assert!(app.feed.fetch_result.is_some());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_fetch_failure_sets_error_without_reload() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags/1/fetch-news"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    sync::refresh_news(&mut app, &tx);
    pump_until(&mut app, &mut rx, &tx, |a| !a.feed.fetching).await;

    assert!(app.feed.fetch_result.is_none());
    assert_eq!(
        app.feed.error.as_deref(),
        Some(cognos::feed_view::FETCH_FAILED_MESSAGE)
    );
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_create_with_empty_name_sends_nothing() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/1/tags"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    sync::open_form(&mut app);
    for c in "   ".chars() {
        app.form.push_char(c);
    }
    sync::submit_form(&mut app, &tx);

    assert_eq!(app.form.error.as_deref(), Some("Tag name is required"));
    assert!(app.form.open);
    assert!(!app.form.submitting);
}

#[tokio::test]
async fn test_create_tag_reloads_tag_list() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_tags()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/1/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "user_id": 1, "tag_name": "Space", "keywords": ["nasa"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;
    let seq_before = app.tags_reload_seq;

    sync::open_form(&mut app);
    for c in "Space".chars() {
        app.form.push_char(c);
    }
    sync::submit_form(&mut app, &tx);
    assert!(app.form.submitting);

    pump_until(&mut app, &mut rx, &tx, |a| !a.form.submitting).await;
    assert!(!app.form.open);
    assert!(app.form.name.is_empty());
    assert_eq!(app.tags_reload_seq, seq_before + 1);

    let reload = timeout(PUMP_TIMEOUT, rx.recv())
        .await
        .expect("tag reload never arrived")
        .expect("event channel closed");
    assert!(matches!(reload, AppEvent::TagsLoaded { .. }));
    handle_app_event(&mut app, reload, &tx);

    // The new tag is not auto-selected.
    assert_eq!(app.selected_tag_id, Some(1));
    assert!(!app.feed.loading);
}

#[tokio::test]
async fn test_create_failure_shows_server_detail() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/1/tags"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Tag already exists"})),
        )
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    sync::open_form(&mut app);
    for c in "AI".chars() {
        app.form.push_char(c);
    }
    sync::submit_form(&mut app, &tx);
    pump_until(&mut app, &mut rx, &tx, |a| !a.form.submitting).await;

    assert!(app.form.open);
    assert_eq!(app.form.name, "AI");
    assert_eq!(app.form.error.as_deref(), Some("Tag already exists"));
}

#[tokio::test]
async fn test_delete_selected_tag_clears_selection_and_reloads() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/tags/\d+/articles$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tags/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Tag deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;
    let seq_before = app.tags_reload_seq;

    sync::request_delete(&mut app);
    sync::confirm_delete(&mut app, &tx);
    assert!(app.is_deleting(1));

    pump_until(&mut app, &mut rx, &tx, |a| !a.is_deleting(1)).await;
    assert!(app.selected_tag_id.is_none());
    assert!(app.feed.tag_id().is_none());
    assert!(app.feed.articles.is_empty());
    assert_eq!(app.tags_reload_seq, seq_before + 1);
    assert!(app.alert.is_none());
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/tags/\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    sync::request_delete(&mut app);
    assert!(app.pending_confirm.is_some());
    sync::cancel_confirm(&mut app);

    assert!(app.pending_confirm.is_none());
    assert!(app.deleting.is_empty());
    assert_eq!(app.tags.len(), 2);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_delete_failure_raises_alert() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path("/tags/1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tags/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Tag not found"})))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;

    sync::request_delete(&mut app);
    sync::confirm_delete(&mut app, &tx);
    pump_until(&mut app, &mut rx, &tx, |a| a.alert.is_some()).await;

    let alert = app.alert.clone().unwrap();
    assert_eq!(alert.title, "Delete failed");
    assert_eq!(alert.message, "Failed to delete tag \"AI\": Tag not found");
    assert!(!app.is_deleting(1));
    assert_eq!(app.selected_tag_id, Some(1));
    assert_eq!(app.tags.len(), 2);
}

#[tokio::test]
async fn test_concurrent_deletes_of_different_tags() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_tags(&server, two_tags()).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/tags/\d+/articles$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tags/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Tag deleted"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tags/2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "locked"})))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = new_app(&server);
    bootstrap(&mut app, &mut rx, &tx).await;
    let seq_before = app.tags_reload_seq;

    sync::request_delete(&mut app);
    sync::confirm_delete(&mut app, &tx);
    app.nav_down();
    sync::request_delete(&mut app);
    sync::confirm_delete(&mut app, &tx);
    assert!(app.is_deleting(1));
    assert!(app.is_deleting(2));

    pump_until(&mut app, &mut rx, &tx, |a| !a.is_deleting(2)).await;
    assert!(app.is_deleting(1));
    assert_eq!(
        app.alert.as_ref().map(|a| a.message.as_str()),
        Some("Failed to delete tag \"Climate\": locked")
    );
    assert_eq!(app.selected_tag_id, Some(1));

    pump_until(&mut app, &mut rx, &tx, |a| !a.is_deleting(1)).await;
    assert!(app.selected_tag_id.is_none());
    assert_eq!(app.tags_reload_seq, seq_before + 1);
}
