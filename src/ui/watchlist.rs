use super::home::movie_row;
use super::{render_header, render_status};
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme.palette();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" My Watchlist ")
        .title_bottom(Line::from(format!(" {} ", app.watchlist.saved_label())).alignment(Alignment::Right));

    if app.watchlist.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from("Your watchlist is empty"),
            Line::from(""),
            Line::from("Browse movies and press w to save them here."),
        ])
        .style(Style::default().fg(palette.muted))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(msg, chunks[1]);
        render_status(app, &[("Esc", "Browse movies"), ("?", "Help")], frame, chunks[2]);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(22);
    let items: Vec<ListItem> = app
        .watchlist
        .entries()
        .iter()
        .map(|movie| movie_row(app, palette, movie, title_width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(palette.highlight_bg)
                .fg(palette.highlight_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(app.watchlist_selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);

    render_status(
        app,
        &[("↑↓", "Navigate"), ("Enter", "Details"), ("d", "Remove"), ("Esc", "Back")],
        frame,
        chunks[2],
    );
}
