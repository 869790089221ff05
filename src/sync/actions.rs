//! User-driven operations.
//!
//! Each function mutates `App` synchronously and spawns at most the network
//! calls the operation needs. Results come back through `handle_app_event`.

use crate::app::{App, AppEvent, ConfirmAction, Phase};
use tokio::sync::mpsc;

use super::tasks::{
    spawn_create_tag, spawn_delete_tag, spawn_fetch_news, spawn_list_articles, spawn_list_tags,
    spawn_list_users,
};

/// Start the bootstrap: users first, tags once a user is known.
pub fn start_bootstrap(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.phase = Phase::Bootstrapping;
    tracing::info!(base_url = %app.client.base_url(), "Bootstrapping");
    spawn_list_users(app.client.clone(), tx.clone());
}

/// Issue a tag-list load. Only the newest load's response will be applied.
pub fn reload_tags(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.tags_reload_seq = app.tags_reload_seq.wrapping_add(1);
    tracing::debug!(seq = app.tags_reload_seq, "Reloading tags");
    spawn_list_tags(app.client.clone(), app.tags_reload_seq, tx.clone());
}

/// Point the article feed at the current selection, loading if it changed.
pub fn sync_feed(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if let Some(ticket) = app.feed.set_tag(app.selected_tag_id) {
        spawn_list_articles(app.client.clone(), ticket, app.min_score, tx.clone());
    }
}

/// Select `tag_id` (or clear the selection with `None`).
///
/// Ids that are not in the current tag list are ignored.
pub fn select_tag(app: &mut App, tag_id: Option<i64>, tx: &mpsc::Sender<AppEvent>) {
    if let Some(id) = tag_id {
        let Some(index) = app.tags.iter().position(|t| t.id == id) else {
            tracing::warn!(tag_id = id, "Ignoring selection of unknown tag");
            return;
        };
        app.tag_cursor = index;
    }
    app.selected_tag_id = tag_id;
    sync_feed(app, tx);
}

/// Select the tag under the keyboard cursor.
pub fn select_tag_under_cursor(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if let Some(id) = app.tag_under_cursor().map(|t| t.id) {
        select_tag(app, Some(id), tx);
    }
}

/// Ask for confirmation before deleting the tag under the cursor.
pub fn request_delete(app: &mut App) {
    let Some(tag) = app.tag_under_cursor() else {
        return;
    };
    let (tag_id, name) = (tag.id, tag.name.clone());
    if app.is_deleting(tag_id) {
        app.set_status(format!("Already deleting \"{}\"", name));
        return;
    }
    app.pending_confirm = Some(ConfirmAction::DeleteTag { tag_id, name });
}

/// Confirm the pending delete: mark the tag busy and issue the request.
pub fn confirm_delete(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let Some(ConfirmAction::DeleteTag { tag_id, name }) = app.pending_confirm.take() else {
        return;
    };
    if !app.deleting.insert(tag_id) {
        tracing::debug!(tag_id, "Delete already in flight");
        return;
    }
    tracing::info!(tag_id, name = %name, "Deleting tag");
    app.set_status(format!("Deleting \"{}\"...", name));
    spawn_delete_tag(app.client.clone(), tag_id, name, tx.clone());
}

/// Decline the pending confirmation. Nothing is sent.
pub fn cancel_confirm(app: &mut App) {
    if app.pending_confirm.take().is_some() {
        app.set_status("Cancelled");
    }
}

pub fn open_form(app: &mut App) {
    if app.phase == Phase::Ready {
        app.form.open();
    }
}

/// Submit the create-tag form.
///
/// Validation failures stay inline in the form; nothing is sent for them.
pub fn submit_form(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let Some(user_id) = app.user.as_ref().map(|u| u.id) else {
        app.form.error = Some("No active user".to_string());
        return;
    };
    if let Some(payload) = app.form.begin_submit(user_id) {
        tracing::info!(user_id, tag_name = %payload.tag_name, keywords = payload.keywords.len(), "Creating tag");
        spawn_create_tag(app.client.clone(), user_id, payload, tx.clone());
    }
}

/// Trigger the remote fetch-news run for the current tag.
pub fn refresh_news(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if let Some(ticket) = app.feed.begin_fetch() {
        spawn_fetch_news(app.client.clone(), ticket, tx.clone());
    }
}

/// Reissue the article load for the current tag.
pub fn reload_articles(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if let Some(ticket) = app.feed.begin_load() {
        spawn_list_articles(app.client.clone(), ticket, app.min_score, tx.clone());
    }
}
