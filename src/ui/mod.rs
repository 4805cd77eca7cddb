mod detail;
mod help;
mod home;
mod watchlist;

use crate::app::{App, View};
use crate::theme::Palette;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match app.view() {
        View::Home => home::render(app, frame),
        View::Detail => detail::render(app, frame),
        View::Watchlist => watchlist::render(app, frame),
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(app.theme.palette(), frame);
    }
}

/// App title plus the current location, like an address bar.
fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let saved = app.watchlist.len();
    let line = Line::from(vec![
        Span::styled(
            " FILMFLUX ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.router.current().to_string(), Style::default().fg(palette.muted)),
        Span::styled(
            format!("   ★ Watchlist ({saved})"),
            Style::default().fg(palette.saved),
        ),
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    );
    frame.render_widget(header, area);
}

/// Bottom line: key hints followed by the status message.
fn render_status(app: &App, hints: &[(&str, &str)], frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let mut spans = key_hints(palette, hints);
    spans.push(Span::styled(&app.status_msg, Style::default().fg(palette.muted)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn key_hints<'a>(palette: Palette, hints: &[(&'a str, &'a str)]) -> Vec<Span<'a>> {
    let key_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key}"), key_style));
        spans.push(Span::raw(format!(" {label} ")));
    }
    spans
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    let width: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if width <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}
