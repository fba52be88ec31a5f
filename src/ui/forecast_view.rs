// ============================================================================
// Vue « Forecast » : tableau + graphique de prévision
// ============================================================================
// Tableau des 5 dernières lignes prédites (fin de l'horizon) et graphique :
// clôtures observées, prévision ponctuelle et bande d'incertitude à 95%.
// L'axe X est en jours depuis la première date observée, commun aux deux
// séries.
// ============================================================================

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Row, Table},
    Frame,
};

use crate::app::{App, PipelineOutput};

/// Dessine la vue de prévision
pub fn render(frame: &mut Frame, app: &App, output: &PipelineOutput, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Tableau
            Constraint::Min(0),    // Graphique
        ])
        .split(area)
        .to_vec();

    render_table(frame, output, chunks[0]);
    render_graph(frame, app, output, chunks[1]);
}

// ============================================================================
// Tableau de la fin de l'horizon
// ============================================================================

fn render_table(frame: &mut Frame, output: &PipelineOutput, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Forecast"),
        Cell::from("Lower"),
        Cell::from("Upper"),
        Cell::from("Trend"),
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = output
        .forecast
        .tail(5)
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.date.format("%Y-%m-%d").to_string()),
                Cell::from(format!("{:.2}", row.yhat))
                    .style(Style::default().fg(Color::Cyan)),
                Cell::from(format!("{:.2}", row.yhat_lower)),
                Cell::from(format!("{:.2}", row.yhat_upper)),
                Cell::from(format!("{:.2}", row.trend)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Forecast data (last 5 rows) "),
        )
        .column_spacing(1);

    frame.render_widget(table, area);
}

// ============================================================================
// Graphique : observé + prévision + bande
// ============================================================================

fn render_graph(frame: &mut Frame, app: &App, output: &PipelineOutput, area: Rect) {
    let forecast = &output.forecast;
    let series = &output.series;

    let origin = match forecast.rows.first().map(|r| r.date) {
        Some(d) => d,
        None => return,
    };

    let to_x = |date: NaiveDate| (date - origin).num_days() as f64;

    // Clôtures observées, sur le même axe temporel que la prévision
    let observed: Vec<(f64, f64)> = series
        .bars
        .iter()
        .map(|bar| (to_x(bar.date), bar.close))
        .collect();

    let yhat: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|row| (to_x(row.date), row.yhat))
        .collect();

    let lower: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|row| (to_x(row.date), row.yhat_lower))
        .collect();

    let upper: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|row| (to_x(row.date), row.yhat_upper))
        .collect();

    // Bornes Y : bande d'incertitude et observations confondues
    let mut y_min = forecast.min_lower().unwrap_or(f64::MAX);
    let mut y_max = forecast.max_upper().unwrap_or(f64::MIN);
    if let (Some(lo), Some(hi)) = (series.min_price(), series.max_price()) {
        y_min = y_min.min(lo);
        y_max = y_max.max(hi);
    }
    let margin = (y_max - y_min) * 0.05;
    let y_min = y_min - margin;
    let y_max = y_max + margin;

    let x_max = forecast
        .last_date()
        .map(to_x)
        .unwrap_or(1.0)
        .max(1.0);

    let datasets = vec![
        Dataset::default()
            .name("Upper")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&upper),
        Dataset::default()
            .name("Lower")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&lower),
        Dataset::default()
            .name("Observed")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Gray))
            .data(&observed),
        Dataset::default()
            .name("Forecast")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .data(&yhat),
    ];

    // Labels : début de l'historique, fin de l'historique, fin de l'horizon
    let train_end_label = series
        .last_date()
        .map(|d| d.format("%m/%Y").to_string())
        .unwrap_or_default();
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(vec![
            Span::raw(origin.format("%m/%Y").to_string()),
            Span::raw(train_end_label),
            Span::raw(
                forecast
                    .last_date()
                    .map(|d| d.format("%m/%Y").to_string())
                    .unwrap_or_default(),
            ),
        ]);

    let y_axis = Axis::default()
        .title("Prix ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.0}", y_min)),
            Span::raw(format!("${:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.0}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(
                    " {} - Prediction of {} year(s) ",
                    forecast.symbol, app.years
                )),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}
