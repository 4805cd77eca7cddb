use crate::theme::Palette;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("q", "Quit (back from detail/watchlist)"),
            ("Ctrl+C", "Quit application"),
            ("t", "Switch dark/light theme"),
            ("W", "Open watchlist"),
        ],
    ),
    (
        "Home",
        &[
            ("/", "Edit search (results follow after a pause)"),
            ("Esc", "Clear search"),
            ("↑/k ↓/j", "Navigate movies"),
            ("Enter", "Open movie details"),
            ("w", "Add/remove from watchlist"),
            ("h l", "History back/forward"),
            ("r", "Reload"),
        ],
    ),
    (
        "Movie Detail",
        &[
            ("↑/↓", "Scroll overview"),
            ("PgUp/PgDn", "Scroll page up/down"),
            ("w", "Add/remove from watchlist"),
            ("Esc/h", "Back"),
        ],
    ),
    (
        "Watchlist",
        &[
            ("↑/↓", "Navigate saved movies"),
            ("Enter", "Open movie details"),
            ("d/w", "Remove from watchlist"),
            ("Esc", "Back"),
        ],
    ),
];

pub fn render(palette: Palette, frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let mut help_text = vec![Line::from("")];
    for (section, bindings) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            format!("  {section}"),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, action) in *bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("    {key:<10}"), Style::default().fg(palette.rating)),
                Span::raw(*action),
            ]));
        }
        help_text.push(Line::from(""));
    }

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press any key to close ").style(Style::default().fg(palette.muted))),
        )
        .style(Style::default().fg(palette.text));

    frame.render_widget(help, area);
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
