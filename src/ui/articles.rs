use crate::app::{App, Focus};
use crate::util::{single_line, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::card::card_lines;

pub(super) const NO_TAG_PROMPT: &str = "Select a tag to see its matched articles.";
pub(super) const NO_ARTICLES_PROMPT: &str =
    "No articles matched yet.\n\nPress r to fetch the latest news for this tag.";

/// Render the article pane for the selected tag.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Articles;
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = match app.selected_tag() {
        Some(tag) => format!(
            "Articles - {} ({})",
            single_line(&tag.name),
            app.feed.articles.len()
        ),
        None => "Articles".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    if app.feed.tag_id().is_none() {
        let prompt = Paragraph::new(NO_TAG_PROMPT)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(prompt, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let banner = banner_lines(app, inner.width as usize);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner.len() as u16),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(Text::from(banner)), chunks[0]);
    render_list(f, app, chunks[1]);
}

/// Toolbar, fetch summary and error lines shown above the list.
fn banner_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let feed = &app.feed;
    let mut lines = Vec::new();

    let refresh = if feed.fetching {
        Span::styled("[r] Fetching news…", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("[r] Fetch news", Style::default().fg(Color::Cyan))
    };
    let mut toolbar = vec![refresh, Span::raw("  [R] Reload")];
    if feed.loading {
        toolbar.push(Span::styled(
            "  Loading…",
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::from(toolbar));

    if let Some(result) = &feed.fetch_result {
        let summary = format!(
            "Fetched {} · {} new · {} matched (threshold {})",
            result.fetched, result.new_articles, result.matched_articles, result.threshold
        );
        lines.push(Line::from(Span::styled(
            truncate_to_width(&summary, width).into_owned(),
            Style::default().fg(Color::Green),
        )));
    }

    if let Some(error) = &feed.error {
        lines.push(Line::from(Span::styled(
            truncate_to_width(error, width).into_owned(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::default());
    lines
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let feed = &app.feed;

    if feed.articles.is_empty() {
        if !feed.loading && feed.error.is_none() {
            let prompt = Paragraph::new(NO_ARTICLES_PROMPT)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::Gray));
            f.render_widget(prompt, area);
        }
        return;
    }

    let width = area.width as usize;
    let show_cursor = app.focus == Focus::Articles;
    let items: Vec<ListItem> = feed
        .articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let mut lines = card_lines(article, width, show_cursor && i == feed.selected);
            lines.push(Line::default());
            ListItem::new(Text::from(lines))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(feed.selected));
    f.render_stateful_widget(List::new(items), area, &mut state);
}
