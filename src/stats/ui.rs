//! Terminal UI for the stats dashboard
//!
//! Renders the same display targets the site binds to, read from a [`Board`],
//! so what the dashboard shows is exactly what the pollers rendered.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::config::ElementBindings;
use crate::stats::countdown::{CountdownPhase, CountdownTargets};
use crate::stats::display::Board;
use crate::stats::metric::Metric;
use crate::stats::poller::LAST_UPDATE_TARGET;

/// Application state for the stats dashboard
pub struct StatsApp {
    pub board: Board,
    pub bindings: ElementBindings,
    pub countdown_targets: CountdownTargets,
    pub countdown_phase: CountdownPhase,
    pub api_base_url: String,
}

impl StatsApp {
    /// Create a new stats application
    pub fn new(board: Board, bindings: ElementBindings, api_base_url: String) -> Self {
        Self {
            board,
            bindings,
            countdown_targets: CountdownTargets::default(),
            countdown_phase: CountdownPhase::Uninitialized,
            api_base_url,
        }
    }

    /// Handle keyboard input, returns true when the dashboard should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
    }

    /// Render the UI
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Length(8), // Mining stats
                Constraint::Min(6),    // Halving countdown
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_stats(f, chunks[1]);
        self.render_countdown(f, chunks[2]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let last_update = self
            .board
            .text_or(LAST_UPDATE_TARGET, "Last updated: never");

        let title = vec![
            Line::from(vec![
                Span::styled(
                    "Palladium Network Stats",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  |  "),
                Span::styled(self.api_base_url.as_str(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(last_update, Style::default().fg(Color::Green))),
            Line::from(Span::styled(
                "Press 'q' to quit | 'r' to refresh",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let header = Row::new(["Metric", "Value"].iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .bottom_margin(1);

        let rows: Vec<Row> = Metric::ALL
            .iter()
            .map(|metric| {
                let text = self.board.text_or(self.bindings.target(*metric), "-");
                Row::new(vec![Cell::from(metric.label()), Cell::from(text)])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Mining Statistics"))
            .column_spacing(1);

        f.render_widget(table, area);
    }

    fn render_countdown(&self, f: &mut Frame, area: Rect) {
        let targets = &self.countdown_targets;
        let clock = format!(
            "{}d {}h {}m {}s",
            self.board.text_or(&targets.days, "--"),
            self.board.text_or(&targets.hours, "--"),
            self.board.text_or(&targets.minutes, "--"),
            self.board.text_or(&targets.seconds, "--"),
        );
        let blocks = self.board.text_or(&targets.blocks_remaining, "--");

        let phase_style = match self.countdown_phase {
            CountdownPhase::Running => Style::default().fg(Color::Green),
            CountdownPhase::Error => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::Yellow),
        };

        let content = vec![
            Line::from(vec![
                Span::styled("Time left: ", Style::default().fg(Color::Cyan)),
                Span::styled(clock, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Blocks remaining: ", Style::default().fg(Color::Cyan)),
                Span::raw(blocks),
            ]),
            Line::from(Span::styled(format!("{:?}", self.countdown_phase), phase_style)),
        ];

        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title("Next Halving"));
        f.render_widget(paragraph, area);
    }
}
