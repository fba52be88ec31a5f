// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Route le rendu selon l'état du pipeline et l'écran courant :
// - aucun ticker : avertissement seul, rien d'autre
// - run en échec : panneau d'erreur avec le message du pipeline
// - run réussi : une des trois vues (brut / prévision / décomposition)
// Le mode saisie ajoute une barre d'input par-dessus la vue courante.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, PipelineState, Screen, AWAITING_TICKER_WARNING};
use crate::ui::{components_view, forecast_view, raw_view};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();

    let constraints = if app.is_in_input_mode() {
        vec![
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Barre de saisie
            Constraint::Length(3), // Footer
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size)
        .to_vec();

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);

    if app.is_in_input_mode() {
        render_input_bar(frame, app, chunks[2]);
        render_footer(frame, app, chunks[3]);
    } else {
        render_footer(frame, app, chunks[2]);
    }
}

// ============================================================================
// Header : titre, ticker courant, prix, horizon
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📈 Stock Price Trend Prediction ")
        .title_alignment(Alignment::Center);

    let mut spans: Vec<Span> = Vec::new();

    if app.has_ticker() {
        spans.push(Span::styled(
            app.ticker.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));

        // Prix actuel + variation du jour, colorés selon le signe
        if let Some(output) = app.output() {
            if let (Some(price), Some(change)) = (
                output.series.last_close(),
                output.series.daily_change_percent(),
            ) {
                let color = if change >= 0.0 { Color::Green } else { Color::Red };
                let arrow = if change >= 0.0 { "▲" } else { "▼" };

                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("${:.2}", price),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("{} {:+.2}%", arrow, change),
                    Style::default().fg(color),
                ));
            }
        }

        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("Years of prediction: {}", app.years),
            Style::default().fg(Color::Yellow),
        ));
    } else {
        spans.push(Span::styled(
            "—",
            Style::default().fg(Color::DarkGray),
        ));
    }

    if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Loading data...".to_string());
        spans.push(Span::raw("   "));
        spans.push(Span::styled(message, Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(vec![Line::from(spans)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Contenu : avertissement / erreur / vue courante
// ============================================================================

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    match &app.pipeline {
        PipelineState::AwaitingTicker => {
            render_warning(frame, area);
        }
        PipelineState::Failed(message) => {
            render_error(frame, area, message);
        }
        PipelineState::Ready(output) => {
            // En mode saisie, la vue Overview sert de fond
            let screen = if app.is_in_input_mode() {
                Screen::Overview
            } else {
                app.screen
            };
            match screen {
                Screen::Overview | Screen::InputMode => {
                    raw_view::render(frame, app, output, area);
                }
                Screen::Forecast => {
                    forecast_view::render(frame, app, output, area);
                }
                Screen::Components => {
                    components_view::render(frame, output, area);
                }
            }
        }
    }
}

/// Avertissement « en attente de ticker »
fn render_warning(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" ⚠ ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            AWAITING_TICKER_WARNING,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[t] Enter stock symbol (e.g., GOOG, AAPL, MSFT, GME)",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Panneau d'erreur (fetch vide, modèle dégénéré, réseau)
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ Erreur ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "[t] Essayer un autre ticker",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Barre de saisie (mode Input)
// ============================================================================

fn render_input_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Saisie ");

    let line = Line::from(vec![
        Span::styled(
            app.input_prompt.clone(),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            app.input_buffer.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("█", Style::default().fg(Color::White)),
    ]);

    let paragraph = Paragraph::new(vec![line]).block(block);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis et confirmations
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = if app.is_awaiting_quit_confirmation() {
        Line::from(Span::styled(
            "Appuyez encore sur 'q' pour quitter",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if app.is_in_input_mode() {
        Line::from(Span::styled(
            "[Enter] Valider  [ESC] Annuler",
            Style::default().fg(Color::Gray),
        ))
    } else {
        Line::from(Span::styled(
            "[t] Ticker  [←/→] Années  [Tab/1/2/3] Vues  [h/l] Zoom  [[/]] Défiler  [q] Quitter",
            Style::default().fg(Color::Gray),
        ))
    };

    let paragraph = Paragraph::new(vec![text])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
