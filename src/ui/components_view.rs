// ============================================================================
// Vue « Components » : décomposition de la prévision
// ============================================================================
// Trois graphiques empilés : tendance, saisonnalité hebdomadaire,
// saisonnalité annuelle. Les trois composantes somment à la prévision
// ponctuelle (modèle additif).
// ============================================================================

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::app::PipelineOutput;
use crate::models::ForecastRow;

/// Dessine les trois composantes de la prévision
pub fn render(frame: &mut Frame, output: &PipelineOutput, area: Rect) {
    let forecast = &output.forecast;

    let origin = match forecast.rows.first().map(|r| r.date) {
        Some(d) => d,
        None => return,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area)
        .to_vec();

    render_component(
        frame,
        chunks[0],
        " Trend ",
        Color::Cyan,
        origin,
        &forecast.rows,
        |row| row.trend,
    );
    render_component(
        frame,
        chunks[1],
        " Weekly seasonality ",
        Color::Green,
        origin,
        &forecast.rows,
        |row| row.weekly,
    );
    render_component(
        frame,
        chunks[2],
        " Yearly seasonality ",
        Color::Magenta,
        origin,
        &forecast.rows,
        |row| row.yearly,
    );
}

/// Dessine une composante (ligne simple, bornes calées sur ses valeurs)
fn render_component(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    origin: NaiveDate,
    rows: &[ForecastRow],
    value: impl Fn(&ForecastRow) -> f64,
) {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .map(|row| ((row.date - origin).num_days() as f64, value(row)))
        .collect();

    if points.is_empty() {
        return;
    }

    let (y_min, y_max) = points.iter().fold(
        (f64::MAX, f64::MIN),
        |(min, max), &(_x, y)| (min.min(y), max.max(y)),
    );

    // Marge absolue minimale : une composante plate resterait invisible
    // avec une marge proportionnelle nulle
    let margin = ((y_max - y_min) * 0.05).max(0.01);
    let y_min = y_min - margin;
    let y_max = y_max + margin;

    let x_max = points.last().map(|&(x, _)| x).unwrap_or(1.0).max(1.0);

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let last_date = rows.last().map(|r| r.date).unwrap_or(origin);
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(vec![
            Span::raw(origin.format("%m/%Y").to_string()),
            Span::raw(last_date.format("%m/%Y").to_string()),
        ]);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title.to_string()),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}
