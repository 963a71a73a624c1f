//! Pool transactions screen rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as TableWidget, TableState},
    Frame,
};

use dexdash::data::dashboard::{address_url, tx_url, TRANSACTION_COLUMNS};

use crate::app::{App, PoolView};
use crate::ui::{format_cell, render_footer, shorten_hash};

const HINTS: &str = "↑/↓ move  r reload  Esc back  ? help  q quit";

/// Renders the transactions of the open pool
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let Some(view) = &app.pool_view else {
        let empty = Paragraph::new("No pool selected. Press Esc to go back.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, chunks[1]);
        render_footer(frame, chunks[2], app.status.as_deref(), HINTS);
        return;
    };

    render_header(frame, app, view, chunks[0]);
    render_table(frame, view, chunks[1]);

    let hint = match selected_tx(view) {
        Some(hash) => format!("{}  |  {}", HINTS, tx_url(&hash)),
        None => HINTS.to_string(),
    };
    render_footer(frame, chunks[2], app.status.as_deref(), &hint);
}

fn selected_tx(view: &PoolView) -> Option<String> {
    let hash = view.transactions.cell_text(view.selected_index, "tx_hash");
    (!hash.is_empty()).then_some(hash)
}

fn render_header(frame: &mut Frame, app: &App, view: &PoolView, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                view.pair.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", app.market),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::raw(address_url(&view.address))),
    ];
    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Pool Transactions "),
    );
    frame.render_widget(header, area);
}

fn render_table(frame: &mut Frame, view: &PoolView, area: Rect) {
    let transactions = &view.transactions;

    let header = Row::new(
        TRANSACTION_COLUMNS
            .iter()
            .map(|(_, label)| Cell::from(*label))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = (0..transactions.len()).map(|row| {
        Row::new(
            TRANSACTION_COLUMNS
                .iter()
                .map(|(column, _)| {
                    let text = format_cell(transactions, row, column);
                    match *column {
                        "sender_address" | "tx_hash" => Cell::from(shorten_hash(&text)),
                        _ => Cell::from(text),
                    }
                })
                .collect::<Vec<_>>(),
        )
    });

    let widths = [
        Constraint::Length(22),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Min(16),
    ];

    let table = TableWidget::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Latest ({}) ", transactions.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !transactions.is_empty() {
        state.select(Some(view.selected_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
