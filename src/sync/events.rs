//! Application event handling.
//!
//! Applies background task results to `App`. Failures become view-local
//! state here; nothing propagates out of the event loop.

use crate::api::{RequestError, Tag, User};
use crate::app::{Alert, App, AppEvent, Phase};
use tokio::sync::mpsc;

use super::actions::{reload_tags, sync_feed};
use super::tasks::{spawn_list_articles, spawn_reload_after};

/// Handle application events from background tasks.
pub fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::UsersLoaded(result) => handle_users_loaded(app, result, event_tx),
        AppEvent::TagsLoaded { seq, result } => handle_tags_loaded(app, seq, result, event_tx),
        AppEvent::ArticlesLoaded { ticket, result } => {
            app.feed.apply_loaded(ticket, result);
        }
        AppEvent::NewsFetched { ticket, result } => {
            if app.feed.apply_fetched(ticket, result) {
                spawn_reload_after(app.refresh_reload_delay, ticket, event_tx.clone());
            }
        }
        AppEvent::ReloadDue(ticket) => {
            if let Some(load) = app.feed.reload_due(ticket) {
                tracing::debug!(tag_id = load.tag_id, "Reloading articles after fetch");
                spawn_list_articles(app.client.clone(), load, app.min_score, event_tx.clone());
            }
        }
        AppEvent::TagCreated(result) => handle_tag_created(app, result, event_tx),
        AppEvent::TagDeleted {
            tag_id,
            name,
            result,
        } => match result {
            Ok(ack) => {
                tracing::info!(tag_id, message = ?ack.message, "Tag deleted");
                app.deleting.remove(&tag_id);
                if app.selected_tag_id == Some(tag_id) {
                    app.selected_tag_id = None;
                    sync_feed(app, event_tx);
                }
                app.set_status(format!("Deleted \"{}\"", name));
                reload_tags(app, event_tx);
            }
            Err(e) => {
                tracing::warn!(tag_id, error = %e, "Tag delete failed");
                app.deleting.remove(&tag_id);
                app.alert = Some(Alert {
                    title: "Delete failed".to_string(),
                    message: format!("Failed to delete tag \"{}\": {}", name, describe(&e)),
                });
            }
        },
        AppEvent::TaskPanicked { task, error } => {
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}

fn handle_users_loaded(
    app: &mut App,
    result: Result<Vec<User>, RequestError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match result {
        Ok(users) => match users.into_iter().next() {
            Some(user) => {
                tracing::info!(user_id = user.id, "Active user");
                app.user = Some(user);
                reload_tags(app, event_tx);
            }
            None => {
                tracing::info!("No users registered");
                app.phase = Phase::NoUser;
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load users");
            app.phase = Phase::NoUser;
        }
    }
}

fn handle_tags_loaded(
    app: &mut App,
    seq: u64,
    result: Result<Vec<Tag>, RequestError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if seq != app.tags_reload_seq {
        tracing::debug!(seq, latest = app.tags_reload_seq, "Discarding superseded tag list");
        return;
    }

    match result {
        Ok(tags) => {
            tracing::debug!(count = tags.len(), "Tags loaded");
            app.replace_tags(tags);
            app.phase = Phase::Ready;
            sync_feed(app, event_tx);
        }
        Err(e) if app.phase == Phase::Bootstrapping => {
            tracing::error!(error = %e, "Failed to load tags during bootstrap");
            app.phase = Phase::Failed(format!("Failed to load tags: {}", describe(&e)));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to reload tags");
            app.set_status(format!("Failed to reload tags: {}", describe(&e)));
        }
    }
}

fn handle_tag_created(
    app: &mut App,
    result: Result<Tag, RequestError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match result {
        Ok(tag) => {
            tracing::info!(tag_id = tag.id, name = %tag.name, "Tag created");
            app.form.on_success();
            app.set_status(format!("Created \"{}\"", tag.name));
            reload_tags(app, event_tx);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Tag create failed");
            app.form.on_failure(&e);
        }
    }
}

/// The server's `detail` when it sent one, otherwise the error itself.
fn describe(error: &RequestError) -> String {
    error
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}
