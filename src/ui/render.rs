//! Render functions for the TUI.
//!
//! Dispatches on the bootstrap phase, then draws overlays on top.

use crate::app::{Alert, App, ConfirmAction, Phase};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{articles, form, help, status, tags};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) const LOADING_TEXT: &str = "Loading…";
pub(super) const NO_USER_TEXT: &str = "No user found. Please create a user first via the API.";

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match &app.phase {
        Phase::Bootstrapping => render_message(f, chunks[0], LOADING_TEXT, Style::default()),
        Phase::NoUser => render_message(f, chunks[0], &no_user_text(app), Style::default()),
        Phase::Failed(message) => render_message(
            f,
            chunks[0],
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Phase::Ready => render_main_panels(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    if app.show_help {
        help::render(f, app);
    }

    if app.form.open {
        form::render(f, &app.form, area);
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, confirm);
    }

    // Alerts go last: they block every other key.
    if let Some(ref alert) = app.alert {
        render_alert_overlay(f, alert);
    }
}

/// The no-user notice, pointing at the backend's API docs.
fn no_user_text(app: &App) -> String {
    match app.client.base_url().join("/docs") {
        Ok(docs) => format!("{}\n\nAPI docs: {}", NO_USER_TEXT, docs),
        Err(_) => NO_USER_TEXT.to_string(),
    }
}

/// Full-area message used for the non-ready phases.
fn render_message(f: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Cognos"));
    f.render_widget(paragraph, area);
}

/// Two-column layout: tags | articles
fn render_main_panels(f: &mut Frame, app: &App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    tags::render(f, app, main_chunks[0]);
    articles::render(f, app, main_chunks[1]);
}

/// Centered rectangle of at most `width` x `height` cells.
fn centered_box(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_confirm_overlay(f: &mut Frame, confirm: &ConfirmAction) {
    let text = match confirm {
        ConfirmAction::DeleteTag { name, .. } => format!(
            "Delete tag \"{}\"?\n\nIts matched articles will no longer be shown.\n\n(y) Confirm  (n/Esc) Cancel",
            name
        ),
    };

    let overlay = centered_box(f.area(), 50, 8);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, overlay);
}

fn render_alert_overlay(f: &mut Frame, alert: &Alert) {
    let overlay = centered_box(f.area(), 56, 8);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(format!("{}\n\n(press any key)", alert.message))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" {} ", alert.title)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, overlay);
}
