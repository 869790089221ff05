//! Input handling for the TUI.
//!
//! Overlays capture keys first (alert, help, confirm, form). Everything else
//! goes through the keybinding registry for the focused panel.

use crate::app::{App, AppEvent, Focus, Phase};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::sync;
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

/// Map the current focus panel to a keybinding context for context-specific lookups.
fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Tags => KbContext::TagList,
        Focus::Articles => KbContext::ArticleList,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if app.alert.is_some() {
        app.alert = None;
        return Action::Continue;
    }

    if app.show_help {
        return handle_help_input(app, code);
    }

    if app.pending_confirm.is_some() {
        return handle_confirm_input(app, code, event_tx);
    }

    if app.form.open {
        return handle_form_input(app, code, modifiers, event_tx);
    }

    let action = app
        .keybindings
        .action_for_key(code, modifiers, focus_to_context(app.focus));

    // Only quit and help are live until the tag list is up.
    if app.phase != Phase::Ready {
        return match action {
            Some(KbAction::Quit) => Action::Quit,
            Some(KbAction::ShowHelp) => {
                app.show_help = true;
                app.help_scroll_offset = 0;
                Action::Continue
            }
            _ => Action::Continue,
        };
    }

    handle_browse_action(app, action, event_tx)
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_confirm_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => sync::confirm_delete(app, event_tx),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => sync::cancel_confirm(app),
        _ => {}
    }
    Action::Continue
}

/// Text entry for the create-tag form.
fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if code == KeyCode::Char('c') {
            return Action::Quit;
        }
        return Action::Continue;
    }

    match code {
        KeyCode::Esc => app.form.close(),
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Enter => sync::submit_form(app, event_tx),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Char(c) => app.form.push_char(c),
        _ => {}
    }
    Action::Continue
}

fn handle_browse_action(
    app: &mut App,
    action: Option<KbAction>,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match action {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::CycleFocus) => app.cycle_focus(),
        Some(KbAction::Back) => app.focus = Focus::Tags,
        Some(KbAction::Select) => sync::select_tag_under_cursor(app, event_tx),
        Some(KbAction::NewTag) => sync::open_form(app),
        Some(KbAction::DeleteTag) => sync::request_delete(app),
        Some(KbAction::RefreshNews) => {
            if app.selected_tag_id.is_none() {
                app.set_status("Select a tag first");
            } else if app.feed.fetching {
                app.set_status("Already fetching news");
            } else {
                sync::refresh_news(app, event_tx);
            }
        }
        Some(KbAction::ReloadArticles) => sync::reload_articles(app, event_tx),
        Some(KbAction::OpenInBrowser) => open_selected_article(app),
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        None => {}
    }
    Action::Continue
}

fn open_selected_article(app: &mut App) {
    let Some(url) = app.feed.selected_article().map(|a| a.url.clone()) else {
        app.set_status("No article selected");
        return;
    };
    match validate_url_for_open(&url) {
        Err(e) => app.set_status(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }
}
