//! Create-tag form overlay.

use crate::tag_form::{FormField, TagForm};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const FIELDS: [FormField; 3] = [FormField::Name, FormField::Keywords, FormField::Category];

fn field_hint(field: FormField) -> &'static str {
    match field {
        FormField::Name => "required",
        FormField::Keywords => "comma separated",
        FormField::Category => "optional",
    }
}

/// Render the form centered over `area`.
pub fn render(f: &mut Frame, form: &TagForm, area: Rect) {
    let width = 60u16.min(area.width.saturating_sub(4));
    let height = 13u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 20 || overlay.height < 8 {
        return;
    }

    let mut lines = Vec::new();
    for field in FIELDS {
        let focused = form.focused == field && !form.submitting;
        let value = match field {
            FormField::Name => &form.name,
            FormField::Keywords => &form.keywords,
            FormField::Category => &form.category,
        };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {}", if focused { ">" } else { " " }, field.label()),
                label_style,
            ),
            Span::styled(
                format!(" ({})", field_hint(field)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(format!(
            "  {}{}",
            value,
            if focused { "_" } else { "" }
        )));
    }

    lines.push(Line::default());
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(if form.submitting {
        Span::styled("Creating tag…", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            "(Tab) Next field  (Enter) Create  (Esc) Cancel",
            Style::default().fg(Color::DarkGray),
        )
    }));

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" New Tag "),
    );
    f.render_widget(paragraph, overlay);
}
