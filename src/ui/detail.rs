use super::{render_header, render_status};
use crate::app::{App, DetailState};
use crate::catalog::MovieDetails;
use crate::theme::Palette;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme.palette();

    // Layout: header(2) + metadata(8) + overview(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);

    let hints: &[(&str, &str)] = &[
        ("↑↓/PgUp/PgDn", "Scroll"),
        ("w", "Watchlist"),
        ("W", "Saved"),
        ("Esc", "Back"),
    ];

    let details = match &app.detail {
        DetailState::Loaded(details) => details,
        DetailState::Loading => {
            render_message(palette, "Loading...", palette.muted, frame, chunks[1].union(chunks[2]));
            render_status(app, hints, frame, chunks[3]);
            return;
        }
        DetailState::Failed(err) => {
            render_message(palette, err, palette.error, frame, chunks[1].union(chunks[2]));
            render_status(app, &[("r", "Reload"), ("Esc", "Back")], frame, chunks[3]);
            return;
        }
    };

    let saved = app.watchlist.contains(details.movie.id);
    render_metadata(palette, details, saved, frame, chunks[1]);

    // ── Overview ──
    let mut body = vec![Line::from(details.movie.overview_text())];
    let images = [
        ("Poster", details.movie.poster_url()),
        ("Backdrop", details.movie.backdrop_url()),
    ];
    if images.iter().any(|(_, url)| url.is_some()) {
        body.push(Line::from(""));
    }
    for (label, url) in images {
        if let Some(url) = url {
            body.push(Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(palette.muted)),
                Span::styled(
                    url,
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::UNDERLINED),
                ),
            ]));
        }
    }

    let overview = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0))
        .style(Style::default().fg(palette.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(" Overview ")
                .title_bottom(
                    Line::from(format!(" scroll: {} ", app.detail_scroll))
                        .alignment(Alignment::Right),
                ),
        );
    frame.render_widget(overview, chunks[2]);

    render_status(app, hints, frame, chunks[3]);
}

fn render_metadata(
    palette: Palette,
    details: &MovieDetails,
    saved: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let movie = &details.movie;
    let label = Style::default().fg(palette.muted);

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {}", movie.title),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ({})", movie.year_label()), label),
    ])];
    if let Some(tagline) = details.tagline() {
        lines.push(Line::from(Span::styled(
            format!(" \"{tagline}\""),
            label.add_modifier(Modifier::ITALIC),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled(" Runtime: ", label),
        Span::styled(details.runtime_label(), Style::default().fg(palette.text)),
        Span::styled("   Rating: ", label),
        Span::styled(format!("★ {}", movie.rating_label()), Style::default().fg(palette.rating)),
    ]));
    if let Some(date) = movie.release_date_label() {
        lines.push(Line::from(vec![
            Span::styled(" Released: ", label),
            Span::styled(date, Style::default().fg(palette.text)),
        ]));
    }
    let genres = details.genre_names();
    if !genres.is_empty() {
        lines.push(Line::from(vec![
            Span::styled(" Genres: ", label),
            Span::styled(genres.join(", "), Style::default().fg(palette.accent)),
        ]));
    }

    lines.push(if saved {
        Line::from(Span::styled(
            " ★ In Watchlist (w to remove)",
            Style::default()
                .fg(palette.saved)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(" ☆ Add to Watchlist (w)", label))
    });

    let meta = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Movie "),
    );
    frame.render_widget(meta, area);
}

fn render_message(
    palette: Palette,
    text: &str,
    color: ratatui::style::Color,
    frame: &mut Frame,
    area: Rect,
) {
    let msg = Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    frame.render_widget(msg, area);
}
