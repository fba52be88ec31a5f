// ============================================================================
// Vue « Raw Data » : tableau + graphique Open/Close
// ============================================================================
// Tableau des 5 dernières barres journalières et graphique ligne des cours
// d'ouverture et de clôture sur la fenêtre visible (zoom/pan gérés par App).
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Row, Table},
    Frame,
};

use crate::app::{App, PipelineOutput};

/// Dessine la vue des données brutes
pub fn render(frame: &mut Frame, app: &App, output: &PipelineOutput, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Tableau (5 lignes + header + bordures)
            Constraint::Min(0),    // Graphique
        ])
        .split(area)
        .to_vec();

    render_table(frame, output, chunks[0]);
    render_graph(frame, app, output, chunks[1]);
}

// ============================================================================
// Tableau des dernières barres
// ============================================================================

fn render_table(frame: &mut Frame, output: &PipelineOutput, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Open"),
        Cell::from("High"),
        Cell::from("Low"),
        Cell::from("Close"),
        Cell::from("Volume"),
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = output
        .series
        .tail(5)
        .iter()
        .map(|bar| {
            // Clôture verte ou rouge selon le sens de la journée
            let close_color = if bar.close >= bar.open {
                Color::Green
            } else {
                Color::Red
            };

            Row::new(vec![
                Cell::from(bar.date.format("%Y-%m-%d").to_string()),
                Cell::from(format!("{:.2}", bar.open)),
                Cell::from(format!("{:.2}", bar.high)),
                Cell::from(format!("{:.2}", bar.low)),
                Cell::from(format!("{:.2}", bar.close))
                    .style(Style::default().fg(close_color)),
                Cell::from(format_volume(bar.volume)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
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
                .title(" Raw data (last 5 days) "),
        )
        .column_spacing(1);

    frame.render_widget(table, area);
}

/// Formate un volume avec un suffixe lisible (K/M/B)
fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if v >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{}", volume)
    }
}

// ============================================================================
// Graphique Open/Close sur la fenêtre visible
// ============================================================================

fn render_graph(frame: &mut Frame, app: &App, output: &PipelineOutput, area: Rect) {
    let series = &output.series;
    let (start, end) = app.visible_range(series.len());
    let window = &series.bars[start..end];

    if window.is_empty() {
        return;
    }

    // Deux séries de points sur l'index absolu des barres
    let opens: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, bar)| ((start + i) as f64, bar.open))
        .collect();

    let closes: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, bar)| ((start + i) as f64, bar.close))
        .collect();

    // Bornes Y sur la fenêtre visible uniquement
    let (min_price, max_price) = window.iter().fold(
        (f64::MAX, f64::MIN),
        |(min, max), bar| (min.min(bar.low), max.max(bar.high)),
    );

    // Marge de 5% pour que le graphique respire
    let margin = (max_price - min_price) * 0.05;
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let datasets = vec![
        Dataset::default()
            .name("Open")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&opens),
        Dataset::default()
            .name("Close")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&closes),
    ];

    // Labels de dates aux bornes et au milieu de la fenêtre
    let mid = window.len() / 2;
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([start as f64, (end - 1).max(start) as f64])
        .labels(vec![
            Span::raw(window[0].date.format("%d/%m/%y").to_string()),
            Span::raw(window[mid].date.format("%d/%m/%y").to_string()),
            Span::raw(window[window.len() - 1].date.format("%d/%m/%y").to_string()),
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
                    " {} - Time Series ({} / {} jours visibles) ",
                    series.symbol,
                    window.len(),
                    series.len()
                )),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}
