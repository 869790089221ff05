use crate::app::{App, Focus, Phase};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match (&app.phase, app.focus) {
            (Phase::Ready, Focus::Tags) => Cow::Borrowed(
                "[Enter]select [n]ew tag [d]elete [r]efresh news [Tab]articles [?]help [q]uit",
            ),
            (Phase::Ready, Focus::Articles) => Cow::Borrowed(
                "[o]pen [r]efresh news [R]eload [Tab]tags [?]help [q]uit",
            ),
            _ => Cow::Borrowed("[?]help [q]uit"),
        }
    };

    let text = if app.is_busy() {
        Cow::Owned(format!(
            "{} {}",
            SPINNER[app.spinner_frame % SPINNER.len()],
            text
        ))
    } else {
        text
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

/// Advance the spinner one frame.
pub(super) fn tick_spinner(app: &mut App) {
    if app.is_busy() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER.len();
        app.needs_redraw = true;
    }
}
