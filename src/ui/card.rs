//! Article card: pure rendering of one article's fields.

use crate::api::Article;
use crate::util::{single_line, truncate_to_width};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Relevance badge text: score × 100, rounded to the nearest integer.
pub fn format_relevance(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

/// Format a backend timestamp as `Mon D, YYYY` (e.g. `Jan 5, 2024`).
///
/// Accepts RFC 3339, naive ISO 8601 datetimes (the backend omits the offset)
/// and plain dates. Returns `None` for anything else.
pub fn format_published(raw: &str) -> Option<String> {
    const DISPLAY: &str = "%b %-d, %Y";
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format(DISPLAY).to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt.format(DISPLAY).to_string());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format(DISPLAY).to_string())
}

/// Badge color by match strength.
fn relevance_style(score: f64) -> Style {
    let color = if score >= 0.7 {
        Color::Green
    } else if score >= 0.4 {
        Color::Yellow
    } else {
        Color::Gray
    };
    Style::default().fg(Color::Black).bg(color)
}

/// Build the lines of one card, each fitting in `width` columns.
///
/// Title (with relevance badge), source and date, description, link.
/// Optional fields that are absent produce no output.
pub fn card_lines(article: &Article, width: usize, selected: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(4);
    let marker = if selected { "▶ " } else { "  " };
    let indent = "  ";
    // Marker and indent both take two columns
    let inner = width.saturating_sub(2);

    // Title + badge
    let badge = article.relevance_score.map(format_relevance);
    let badge_width = badge.as_ref().map_or(0, |b| b.len() + 3);
    let title = single_line(&article.title);
    let title = truncate_to_width(&title, inner.saturating_sub(badge_width)).into_owned();
    let title_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let mut spans = vec![Span::raw(marker), Span::styled(title, title_style)];
    if let (Some(badge), Some(score)) = (badge, article.relevance_score) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", badge), relevance_style(score)));
    }
    lines.push(Line::from(spans));

    // Source and date
    let mut meta = Vec::new();
    if let Some(source) = article.source.as_deref().map(single_line) {
        if !source.is_empty() {
            meta.push(source);
        }
    }
    if let Some(date) = article.published_at.as_deref().and_then(format_published) {
        meta.push(date);
    }
    if !meta.is_empty() {
        let meta = meta.join(" · ");
        lines.push(Line::from(vec![
            Span::raw(indent),
            Span::styled(
                truncate_to_width(&meta, inner).into_owned(),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    if let Some(description) = article.description.as_deref().map(single_line) {
        if !description.is_empty() {
            lines.push(Line::from(vec![
                Span::raw(indent),
                Span::raw(truncate_to_width(&description, inner).into_owned()),
            ]));
        }
    }

    let link = format!("Read more → {}", single_line(&article.url));
    lines.push(Line::from(vec![
        Span::raw(indent),
        Span::styled(
            truncate_to_width(&link, inner).into_owned(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ]));

    lines
}
