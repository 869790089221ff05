//! Background task spawners.
//!
//! Each spawner runs exactly one API call on the runtime and reports the
//! outcome to the event loop as an [`AppEvent`]. Tasks own a clone of the
//! client and never touch `App`.

use crate::api::{ApiClient, NewTag};
use crate::app::AppEvent;
use crate::feed_view::{FetchTicket, LoadTicket};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `work` and send the event it produces.
///
/// A panic inside `work` is reported as `AppEvent::TaskPanicked` instead.
fn spawn_task<F>(task: &'static str, tx: mpsc::Sender<AppEvent>, work: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    })
}

pub(crate) fn spawn_list_users(client: ApiClient, tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    spawn_task("list_users", tx, async move {
        AppEvent::UsersLoaded(client.list_users().await)
    })
}

pub(crate) fn spawn_list_tags(
    client: ApiClient,
    seq: u64,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_task("list_tags", tx, async move {
        AppEvent::TagsLoaded {
            seq,
            result: client.list_tags().await,
        }
    })
}

pub(crate) fn spawn_list_articles(
    client: ApiClient,
    ticket: LoadTicket,
    min_score: Option<f64>,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_task("load_articles", tx, async move {
        AppEvent::ArticlesLoaded {
            ticket,
            result: client.list_articles(ticket.tag_id, min_score).await,
        }
    })
}

pub(crate) fn spawn_fetch_news(
    client: ApiClient,
    ticket: FetchTicket,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_task("fetch_news", tx, async move {
        AppEvent::NewsFetched {
            ticket,
            result: client.fetch_news(ticket.tag_id).await,
        }
    })
}

/// Emit `ReloadDue` once `delay` has elapsed.
pub(crate) fn spawn_reload_after(
    delay: Duration,
    ticket: FetchTicket,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_task("reload_timer", tx, async move {
        tokio::time::sleep(delay).await;
        AppEvent::ReloadDue(ticket)
    })
}

pub(crate) fn spawn_create_tag(
    client: ApiClient,
    user_id: i64,
    payload: NewTag,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_task("create_tag", tx, async move {
        AppEvent::TagCreated(client.create_tag(user_id, &payload).await)
    })
}

pub(crate) fn spawn_delete_tag(
    client: ApiClient,
    tag_id: i64,
    name: String,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_task("delete_tag", tx, async move {
        AppEvent::TagDeleted {
            tag_id,
            name,
            result: client.delete_tag(tag_id).await,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explode() -> AppEvent {
        panic!("kaput {}", 1)
    }

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_reports_message() {
        let result = catch_task_panic(async { explode() }).await;
        assert_eq!(result.err().as_deref(), Some("kaput 1"));
    }

    #[tokio::test]
    async fn test_spawned_panic_becomes_event() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_task("explode", tx, async { explode() });
        match rx.recv().await {
            Some(AppEvent::TaskPanicked { task, error }) => {
                assert_eq!(task, "explode");
                assert_eq!(error, "kaput 1");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_timer_waits_for_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let ticket = FetchTicket { tag_id: 1, epoch: 3 };
        spawn_reload_after(Duration::from_millis(1000), ticket, tx);

        tokio::time::advance(Duration::from_millis(999)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        match rx.recv().await {
            Some(AppEvent::ReloadDue(t)) => assert_eq!(t, ticket),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
