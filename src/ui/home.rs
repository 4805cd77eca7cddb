use super::{render_header, render_status, truncate_str};
use crate::app::{App, InputMode, Listing};
use crate::catalog::Movie;
use crate::theme::Palette;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

const SEARCH_LABEL: &str = " Search movies: ";

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let featured = app.featured();

    // Layout: header(2) + search(3) + featured(0|6) + list(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(if featured.is_some() { 6 } else { 0 }),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);
    render_search_bar(app, frame, chunks[1]);
    if let Some(movie) = featured {
        render_featured(app.theme.palette(), movie, frame, chunks[2]);
    }
    render_listing(app, frame, chunks[3]);

    let hints: &[(&str, &str)] = if app.input_mode == InputMode::Editing {
        &[("Enter/Esc", "Done")]
    } else {
        &[
            ("/", "Search"),
            ("↑↓", "Navigate"),
            ("Enter", "Details"),
            ("w", "Save"),
            ("W", "Watchlist"),
            ("?", "Help"),
        ]
    };
    render_status(app, hints, frame, chunks[4]);
}

fn render_search_bar(app: &App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let editing = app.input_mode == InputMode::Editing;
    let style = if editing {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };

    let buffer = app.search.buffer();
    let mut spans = vec![
        Span::styled(SEARCH_LABEL, style),
        Span::styled(buffer, Style::default().fg(palette.text)),
    ];
    if app.search.is_pending() {
        spans.push(Span::styled(" …", Style::default().fg(palette.muted)));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(if editing { " Search (Enter/Esc to finish) " } else { " Search (/) " }),
    );
    frame.render_widget(bar, area);

    if editing {
        let offset = (SEARCH_LABEL.width() + buffer.width()) as u16;
        let cursor_x = (area.x + 1 + offset).min(area.right().saturating_sub(2));
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_featured(palette: Palette, movie: &Movie, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                movie.title.as_str(),
                Style::default()
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", movie.year_label()), Style::default().fg(palette.muted)),
            Span::styled(format!("  ★ {}", movie.rating_label()), Style::default().fg(palette.rating)),
        ]),
        Line::from(truncate_str(movie.overview_text(), width)),
    ];
    if let Some(url) = movie.featured_image_url() {
        lines.push(Line::from(Span::styled(
            truncate_str(&url, width),
            Style::default().fg(palette.muted),
        )));
    }

    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(" Featured "),
    );
    frame.render_widget(card, area);
}

fn render_listing(app: &App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let title = match app.active_query() {
        Some(q) => format!(" Results for \"{q}\" "),
        None => " Trending This Week ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(title);

    let movies = match &app.listing {
        Listing::Loaded(movies) => movies,
        Listing::Loading => {
            let msg = Paragraph::new("Loading...")
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(msg, area);
            return;
        }
        Listing::Empty => {
            let text = match app.active_query() {
                Some(q) => format!("No movies found for \"{q}\""),
                None => "No trending movies right now".to_string(),
            };
            let msg = Paragraph::new(text)
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(msg, area);
            return;
        }
        Listing::Failed(err) => {
            let msg = Paragraph::new(vec![
                Line::from(Span::styled(err.as_str(), Style::default().fg(palette.error))),
                Line::from(""),
                Line::from(Span::styled("Press r to reload", Style::default().fg(palette.muted))),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(msg, area);
            return;
        }
    };

    let title_width = (area.width as usize).saturating_sub(22);
    let items: Vec<ListItem> = movies
        .iter()
        .map(|movie| movie_row(app, palette, movie, title_width))
        .collect();

    let position = format!(" {}/{} ", app.list_selected + 1, movies.len());
    let list = List::new(items)
        .block(block.title_bottom(Line::from(position).alignment(Alignment::Right)))
        .highlight_style(
            Style::default()
                .bg(palette.highlight_bg)
                .fg(palette.highlight_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(app.list_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// One list line: saved marker, title, year and rating.
pub(super) fn movie_row(
    app: &App,
    palette: Palette,
    movie: &Movie,
    title_width: usize,
) -> ListItem<'static> {
    let saved = app.watchlist.contains(movie.id);
    ListItem::new(Line::from(vec![
        Span::styled(
            if saved { "★ " } else { "  " },
            Style::default().fg(palette.saved),
        ),
        Span::styled(
            format!("{:<title_width$}", truncate_str(&movie.title, title_width)),
            Style::default().fg(palette.text),
        ),
        Span::styled(format!(" {:>4}", movie.year_label()), Style::default().fg(palette.muted)),
        Span::styled(format!("  ★ {:>4}", movie.rating_label()), Style::default().fg(palette.rating)),
    ]))
}
