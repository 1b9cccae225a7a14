//! Mirrored rolling peak plots.
//!
//! Each tap point is a signed block peak. The plot draws its magnitude above
//! and below the zero line, so a decaying tail reads as a shrinking band
//! whatever the sign of the individual peaks. The y range is fixed at full
//! scale so the three plots stay comparable.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

const FULL_SCALE: f64 = 1.0;
const FLOOR_DB: f32 = -60.0;

/// Upper and lower envelope points, x spread over `0..1`.
fn envelope(history: &[f32]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let span = history.len().saturating_sub(1).max(1) as f64;
    history
        .iter()
        .enumerate()
        .map(|(i, &peak)| {
            let x = i as f64 / span;
            let level = (peak.abs() as f64).min(FULL_SCALE);
            ((x, level), (x, -level))
        })
        .unzip()
}

/// Peak level for the title, floored at -60 dBFS.
fn peak_label(peak: f32) -> String {
    let magnitude = peak.abs();
    if magnitude <= 0.0 {
        return format!("<{FLOOR_DB:.0} dB");
    }
    let db = 20.0 * magnitude.log10();
    if db < FLOOR_DB {
        format!("<{FLOOR_DB:.0} dB")
    } else {
        format!("{db:+.1} dB")
    }
}

pub fn render_peaks(frame: &mut Frame, area: Rect, label: &str, history: &[f32], color: Color) {
    let latest = history.last().copied().unwrap_or(0.0);
    let title = format!(" {label} {} ", peak_label(latest));
    let (upper, lower) = envelope(history);
    let style = Style::default().fg(color);

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(style)
            .data(&upper),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(style)
            .data(&lower),
    ];

    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(Axis::default().bounds([0.0, 1.0]).style(axis_style))
        .y_axis(
            Axis::default()
                .bounds([-FULL_SCALE, FULL_SCALE])
                .labels([Span::raw("-1"), Span::raw("0"), Span::raw("1")])
                .style(axis_style),
        );

    frame.render_widget(chart, area);
}
