//! Dashboard screen rendering
//!
//! Header with the selected market, KPI boxes, 7-day volume and liquidity
//! sparklines, and the pools table.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as TableWidget, TableState},
    Frame,
};

use dexdash::data::dashboard::{address_url, format_thousands, ChartPoint, POOL_COLUMNS};
use dexdash::data::EcosystemSummary;

use crate::app::{App, InputMode};
use crate::ui::widgets::SeriesSparkline;
use crate::ui::{format_cell, render_footer, shorten_hash};

const HINTS: &str = "c chain  x exchange  / search  Enter transactions  r refresh  ? help  q quit";

/// Renders the dashboard for the app's current snapshot
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(4), // KPIs
            Constraint::Length(4), // charts
            Constraint::Min(5),    // pools
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.snapshot {
        Some(snapshot) => {
            render_kpis(frame, &snapshot.summary, chunks[1]);
            render_charts(frame, &snapshot.summary, chunks[2]);
        }
        None => {
            let empty = Paragraph::new("No data loaded. Press r to retry.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(empty, chunks[1]);
        }
    }

    render_pools(frame, app, chunks[3]);
    render_footer(frame, chunks[4], app.status.as_deref(), &footer_hint(app));
}

fn footer_hint(app: &App) -> String {
    match app.selected_pool() {
        Some((address, _)) => format!("{}  |  {}", HINTS, address_url(&address)),
        None => HINTS.to_string(),
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let refreshed = app
        .last_refresh
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut spans = vec![
        Span::styled(
            app.market.exchange.name(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" on "),
        Span::styled(
            app.market.chain.name(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  (updated {})", refreshed),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if app.input_mode == InputMode::Search || !app.search_query.is_empty() {
        let cursor = if app.input_mode == InputMode::Search { "_" } else { "" };
        spans.push(Span::raw("   Search: "));
        spans.push(Span::styled(
            format!("{}{}", app.search_query, cursor),
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" dexdash "),
    );
    frame.render_widget(header, area);
}

fn render_kpis(frame: &mut Frame, summary: &EcosystemSummary, area: Rect) {
    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (i, (label, value)) in summary.kpis().into_iter().enumerate() {
        let kpi = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", label)));
        frame.render_widget(kpi, boxes[i]);
    }
}

fn render_charts(frame: &mut Frame, summary: &EcosystemSummary, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_chart(frame, " Volume 7d ", &summary.volume_chart_7d, Color::Cyan, halves[0]);
    render_chart(
        frame,
        " Liquidity 7d ",
        &summary.liquidity_chart_7d,
        Color::Green,
        halves[1],
    );
}

fn render_chart(frame: &mut Frame, title: &str, points: &[ChartPoint], color: Color, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let latest = points
        .last()
        .map(|p| format!(" {}  {}", format_thousands(p.value, 0), p.date.format("%b %d")))
        .unwrap_or_else(|| " no data".to_string());

    let rows = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(values.len() as u16), Constraint::Min(0)])
        .split(Rect { height: 1, ..inner });

    frame.render_widget(
        SeriesSparkline::new(&values).style(Style::default().fg(color)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(latest).style(Style::default().fg(Color::Gray)),
        rows[1],
    );
}

fn render_pools(frame: &mut Frame, app: &App, area: Rect) {
    let pools = &app.visible_pools;
    let title = match &app.snapshot {
        Some(snapshot) if pools.len() != snapshot.pools.len() => {
            format!(" Pools ({} of {}) ", pools.len(), snapshot.pools.len())
        }
        _ => format!(" Pools ({}) ", pools.len()),
    };

    let header = Row::new(
        POOL_COLUMNS
            .iter()
            .map(|(_, label)| Cell::from(*label))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = (0..pools.len()).map(|row| {
        Row::new(
            POOL_COLUMNS
                .iter()
                .map(|(column, _)| {
                    let text = format_cell(pools, row, column);
                    if *column == "exchange" {
                        Cell::from(shorten_hash(&text))
                    } else {
                        Cell::from(text)
                    }
                })
                .collect::<Vec<_>>(),
        )
    });

    let widths = [
        Constraint::Min(16),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(16),
    ];

    let table = TableWidget::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !pools.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_dashboard_renders_snapshot() {
        let mut app = crate::ui::tests_support::dashboard_app();
        app.state = AppState::Dashboard;
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("SushiSwap"), "Should show exchange");
        assert!(content.contains("Ethereum"), "Should show chain");
        assert!(content.contains("Total Swaps"), "Should show KPI labels");
        assert!(content.contains("1,200"), "Should format KPI values");
        assert!(content.contains("Volume 7d"), "Should show volume chart");
        assert!(content.contains("WETH - USDC"), "Should list pools");
        assert!(content.contains("Pools (2)"), "Should count pools");
    }

    #[test]
    fn test_dashboard_without_snapshot() {
        let mut app = crate::ui::tests_support::empty_app();
        app.state = AppState::Dashboard;
        app.status = Some("No update for SushiSwap on Ethereum: offline".to_string());
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("No data loaded"));
        assert!(content.contains("No update for"));
    }

    #[test]
    fn test_dashboard_shows_search_box() {
        let mut app = crate::ui::tests_support::dashboard_app();
        app.input_mode = InputMode::Search;
        app.search_query = "usdc".to_string();
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        assert!(buffer_text(&terminal).contains("Search: usdc_"));
    }
}
