//! TUI rendering for verb
//!
//! Three rolling plots (dry, wet, mix) above the control list and a
//! status bar.

mod controls;
mod peaks;
mod status;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

use controls::render_controls;
use peaks::render_peaks;
use status::render_status;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(6),    // Plots
            Constraint::Length(6), // Controls
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], app);

    let plots = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);
    render_peaks(frame, plots[0], "Dry", app.taps.dry.snapshot(), Color::Cyan);
    render_peaks(frame, plots[1], "Wet", app.taps.wet.snapshot(), Color::Magenta);
    render_peaks(frame, plots[2], "Mix", app.taps.mix.snapshot(), Color::Yellow);

    render_controls(frame, chunks[2], app);

    let help = Paragraph::new(" [Space] Start/Stop  [Tab/↑↓] Select  [←→] Adjust  [Q] Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
