//! Key binding reference, one section per input mode

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const OVERLAY_WIDTH: u16 = 52;

/// (mode, [(keys, action)])
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Dashboard",
        &[
            ("↑/k ↓/j", "Select pool"),
            ("Enter", "Pool transactions"),
            ("c / x", "Next chain / exchange"),
            ("/", "Search pools by token"),
            ("r", "Refresh, skipping the cache"),
            ("Esc", "Clear search, else quit"),
        ],
    ),
    (
        "Search",
        &[
            ("type", "Filter as you type"),
            ("Bksp", "Delete last character"),
            ("Enter", "Keep filter"),
            ("Esc", "Drop filter"),
        ],
    ),
    (
        "Pool transactions",
        &[
            ("↑/k ↓/j", "Select transaction"),
            ("r", "Reload transactions"),
            ("Esc/Bksp", "Back to dashboard"),
        ],
    ),
    ("Outside search", &[("?", "Toggle this help"), ("q", "Quit")]),
];

/// Draws the overlay centered over whatever is on screen
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    let height = lines.len() as u16 + 2;
    let area = centered(frame.area(), OVERLAY_WIDTH, height);

    let block = Block::default()
        .title(" Keys ")
        .title_bottom(Line::styled(" Esc or ? closes ", Style::default().fg(Color::DarkGray)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn help_lines() -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    for (index, (mode, keys)) in SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(*mode, heading)));
        lines.extend(keys.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {:>9}  ", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        }));
    }
    lines
}

/// `width` x `height` in the middle of `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
