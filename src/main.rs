// ============================================================================
// StockCast - Dashboard TUI de prévision de cours
// ============================================================================
// Saisir un ticker et un horizon (1 à 4 ans), charger l'historique journalier
// depuis Yahoo Finance, ajuster un modèle additif et afficher données brutes,
// prévision et décomposition.
//
// Architecture : l'event loop (thread principal) ne fait jamais d'I/O. Le
// pipeline fetch -> fit -> predict tourne dans un worker thread qui possède
// le runtime tokio et le cache de données ; la communication passe par deux
// channels mpsc (commandes / résultats).
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use stockcast::api::DataLoader;
use stockcast::app::{App, PipelineOutput};
use stockcast::forecast::forecast_series;
use stockcast::ui::{events::EventHandler, render};

// ============================================================================
// Commandes et résultats du worker
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Exécuter le pipeline complet pour un ticker et un horizon
    RunPipeline { ticker: String, years: u8 },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Pipeline terminé avec succès
    PipelineDone {
        ticker: String,
        output: PipelineOutput,
    },

    /// Pipeline en échec (fetch vide, réseau, modèle dégénéré)
    PipelineFailed { ticker: String, message: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le logging vers fichier avec rotation quotidienne
///
/// Les println! ne fonctionnent plus une fois le TUI lancé : tout passe
/// par tracing vers un fichier. Niveau contrôlable via RUST_LOG.
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|d| d.join("stockcast").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stockcast.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockcast=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    // Si le logging échoue, on continue quand même : l'app reste utilisable
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("StockCast starting up");

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // État partagé entre l'event loop et le worker
    let app = Arc::new(Mutex::new(App::new()));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning pipeline worker thread");
    spawn_pipeline_worker(command_rx, result_tx, app.clone());

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app.clone(), &events, command_tx, result_rx);

    // Restaure le terminal même en cas d'erreur
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Worker thread du pipeline
// ============================================================================

/// Worker qui exécute le pipeline fetch -> fit -> predict
///
/// Possède le runtime tokio et le DataLoader : le cache de séries vit
/// ici, pour toute la durée du processus. block_on() bloque ce thread,
/// jamais l'event loop.
fn spawn_pipeline_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
) {
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        let loader = DataLoader::new();

        loop {
            match command_rx.recv() {
                Ok(command) => {
                    info!(?command, "Worker received command");

                    match command {
                        AppCommand::RunPipeline { ticker, years } => {
                            {
                                let mut app_lock = app.lock().unwrap();
                                app_lock.start_loading(Some(format!("Loading data for {}...", ticker)));
                            }

                            let result = runtime
                                .block_on(async { loader.load(&ticker).await })
                                .map_err(|e| e.to_string())
                                .and_then(|series| {
                                    forecast_series(&series, years)
                                        .map(|forecast| PipelineOutput { series, forecast })
                                        .map_err(|e| e.to_string())
                                });

                            match result {
                                Ok(output) => {
                                    info!(
                                        ticker = %ticker,
                                        bars = output.series.len(),
                                        forecast_rows = output.forecast.len(),
                                        "Pipeline completed"
                                    );
                                    let _ = result_tx.send(AppResult::PipelineDone { ticker, output });
                                }
                                Err(message) => {
                                    error!(ticker = %ticker, error = %message, "Pipeline failed");
                                    let _ = result_tx.send(AppResult::PipelineFailed { ticker, message });
                                }
                            }

                            {
                                let mut app_lock = app.lock().unwrap();
                                app_lock.stop_loading();
                            }
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé : l'event loop a terminé
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event loop
// ============================================================================

/// Boucle principale : résultats du worker -> rendu -> événements clavier
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        // Lock minimal : juste le temps de lire is_running
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // Résultats du worker (non bloquant)
        match result_rx.try_recv() {
            Ok(result) => {
                let mut app_lock = app.lock().unwrap();
                match result {
                    AppResult::PipelineDone { ticker, output } => {
                        // Résultat périmé si l'utilisateur a changé de ticker
                        // pendant le run
                        if ticker == app_lock.ticker {
                            info!(ticker = %ticker, "Applying pipeline output");
                            app_lock.set_ready(output);
                        } else {
                            debug!(ticker = %ticker, current = %app_lock.ticker, "Discarding stale pipeline output");
                        }
                    }
                    AppResult::PipelineFailed { ticker, message } => {
                        if ticker == app_lock.ticker {
                            error!(ticker = %ticker, error = %message, "Showing pipeline failure");
                            app_lock.set_failed(message);
                        }
                    }
                }
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
            }
        }

        // Rendu
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // Événements clavier
        if let Ok(event) = events.next() {
            let mut app_lock = app.lock().unwrap();
            handle_event(&mut app_lock, event, &command_tx);
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Met à jour l'état selon l'événement et envoie les commandes au worker
fn handle_event(app: &mut App, event: stockcast::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use stockcast::ui::events::{
        get_char_from_event, is_backspace_event, is_components_event, is_enter_event,
        is_escape_event, is_forecast_event, is_next_view_event, is_overview_event,
        is_pan_back_event, is_pan_forward_event, is_quit_event, is_ticker_char_event,
        is_ticker_input_event, is_years_down_event, is_years_up_event, is_zoom_in_event,
        is_zoom_out_event, Event,
    };

    // Nombre de barres du graphique brut, pour le zoom/pan
    let total_bars = app.output().map(|o| o.series.len()).unwrap_or(0);

    match event {
        // ========================================
        // Mode saisie : prioritaire sur tout sauf quit
        // ========================================

        // ESC : annuler la saisie
        Event::Key(_) if is_escape_event(&event) && app.is_in_input_mode() => {
            info!("User cancelled input");
            app.cancel_input();
        }

        // Enter : valider le ticker et lancer le pipeline
        Event::Key(_) if is_enter_event(&event) && app.is_in_input_mode() => {
            let ticker = app.submit_input().trim().to_uppercase();
            if !ticker.is_empty() {
                info!(ticker = %ticker, "User submitted ticker");
                app.set_ticker(ticker.clone());
                let _ = command_tx.send(AppCommand::RunPipeline {
                    ticker,
                    years: app.years,
                });
            } else {
                debug!("Empty ticker symbol, ignoring");
            }
        }

        // Backspace : supprimer le dernier caractère
        Event::Key(_) if is_backspace_event(&event) && app.is_in_input_mode() => {
            app.backspace();
        }

        // Caractères : ajouter au buffer
        Event::Key(_) if is_ticker_char_event(&event) && app.is_in_input_mode() => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        // ========================================
        // Navigation et commandes (hors saisie)
        // ========================================

        // 'q' : quit confirmation two-step
        Event::Key(_) if is_quit_event(&event) && !app.is_in_input_mode() => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // 't' : saisir un nouveau ticker
        Event::Key(_) if is_ticker_input_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            info!("User opened ticker input");
            app.start_input("Select dataset for prediction: ".to_string());
        }

        // Flèches gauche/droite : horizon de prévision
        // Le changement relance le pipeline : la série vient du cache,
        // seul le modèle est recalculé
        Event::Key(_) if is_years_down_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            if app.years_down() && app.has_ticker() {
                info!(years = app.years, "User decreased forecast horizon");
                let _ = command_tx.send(AppCommand::RunPipeline {
                    ticker: app.ticker.clone(),
                    years: app.years,
                });
            }
        }
        Event::Key(_) if is_years_up_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            if app.years_up() && app.has_ticker() {
                info!(years = app.years, "User increased forecast horizon");
                let _ = command_tx.send(AppCommand::RunPipeline {
                    ticker: app.ticker.clone(),
                    years: app.years,
                });
            }
        }

        // Tab / 1 / 2 / 3 : changement de vue
        Event::Key(_) if is_next_view_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.next_view();
        }
        Event::Key(_) if is_overview_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.show_overview();
        }
        Event::Key(_) if is_forecast_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.show_forecast();
        }
        Event::Key(_) if is_components_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.show_components();
        }

        // 'l' / 'h' : zoom sur le graphique brut (équivalent du range-slider)
        Event::Key(_) if is_zoom_in_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.zoom_in(total_bars);
        }
        Event::Key(_) if is_zoom_out_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.zoom_out(total_bars);
        }

        // '[' / ']' : glissement de la fenêtre visible
        Event::Key(_) if is_pan_back_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.pan_back(total_bars);
        }
        Event::Key(_) if is_pan_forward_event(&event) && !app.is_in_input_mode() => {
            app.cancel_quit();
            app.pan_forward(total_bars);
        }

        Event::Tick => {
            // Tick régulier : rien à faire
        }

        Event::Key(_) => {
            // Toute autre touche annule la confirmation de quit
            app.cancel_quit();
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même en cas d'erreur, pour ne pas laisser le
/// terminal cassé.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
