use crate::app::{App, Focus};
use crate::util::{single_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub(super) const EMPTY_PROMPT: &str = "No tags yet.\n\nPress n to create your first tag.";

/// Render the tag sidebar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Tags;
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("Tags ({})", app.tags.len()));

    if app.tags.is_empty() {
        let prompt = Paragraph::new(EMPTY_PROMPT)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(prompt, area);
        return;
    }

    // Room inside the borders
    let width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = app
        .tags
        .iter()
        .enumerate()
        .map(|(i, tag)| {
            let is_selected = app.selected_tag_id == Some(tag.id);
            let deleting = app.is_deleting(tag.id);

            let marker = if deleting {
                Span::styled("⟳ ", Style::default().fg(Color::Yellow))
            } else if is_selected {
                Span::styled("● ", Style::default().fg(Color::Cyan))
            } else {
                Span::raw("  ")
            };

            let badge = tag
                .category
                .as_deref()
                .map(single_line)
                .filter(|c| !c.is_empty());
            let badge_width = badge.as_ref().map_or(0, |b| b.chars().count() + 3);

            let name = single_line(&tag.name);
            let name = truncate_to_width(&name, width.saturating_sub(2 + badge_width)).into_owned();

            let mut name_style = if deleting {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            if is_selected {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            if is_focused && i == app.tag_cursor {
                name_style = name_style.bg(Color::DarkGray).fg(Color::White);
            }

            let mut spans = vec![marker, Span::styled(name, name_style)];
            if let Some(badge) = badge {
                spans.push(Span::styled(
                    format!(" [{}]", badge),
                    Style::default().fg(Color::Magenta),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.tag_cursor));
    f.render_stateful_widget(List::new(items).block(block), area, &mut state);
}
