//! Status bar widget - run state, format and realtime counters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_reverb::engine::RunState;

use crate::app::App;

pub fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" verb ").borders(Borders::ALL);

    let state = app.runner.state();
    let (symbol, label, color) = match state {
        RunState::Running => ("▶", "Running", Color::Green),
        RunState::Starting => ("…", "Starting", Color::Yellow),
        RunState::Stopped => ("■", "Stopped", Color::Yellow),
    };
    let config = app.runner.config();
    let stats = app.runner.stats();

    let mut spans = vec![
        Span::styled(format!(" {symbol} {label}  "), Style::default().fg(color)),
        Span::styled(
            format!(
                "{:.1}kHz  {} ch  {} frames  ",
                config.sample_rate / 1000.0,
                config.channels,
                config.block_size
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "blocks: {}  overruns: {}  dropped: {}  errors: {}",
                stats.blocks, stats.overruns, stats.dropped_blocks, stats.stream_errors
            ),
            Style::default().fg(Color::Magenta),
        ),
    ];
    if let Some(message) = &app.message {
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
