//! Parameter list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_reverb::param::ParamHandle;

use crate::app::{App, Control};

pub fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);

    let lines: Vec<Line> = Control::ALL
        .iter()
        .enumerate()
        .map(|(i, control)| {
            let (name, value) = match control {
                Control::Feedback => param_row(&app.controls.feedback, 100.0),
                Control::Cutoff => param_row(&app.controls.cutoff, 1.0),
                Control::Balance => param_row(&app.controls.balance, 100.0),
                Control::Ramp => (
                    "Ramp".to_string(),
                    format!("{:.0} ms", app.controls.ramp_duration() * 1000.0),
                ),
            };

            let selected = i == app.selected;
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if selected { "▶ " } else { "  " };

            Line::from(vec![
                Span::styled(format!("{marker}{name:<18}"), style),
                Span::raw("  "),
                Span::styled(value, Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Name and "current → target unit" text. `scale` turns fractions into
/// percentages for display.
fn param_row(handle: &ParamHandle, scale: f32) -> (String, String) {
    let spec = handle.spec();
    let current = handle.current() * scale;
    let target = handle.target() * scale;
    let value = if (current - target).abs() > f32::EPSILON * scale.max(1.0) {
        format!("{current:.1} → {target:.1} {}", spec.unit)
    } else {
        format!("{target:.1} {}", spec.unit)
    };
    (spec.name.to_string(), value)
}
