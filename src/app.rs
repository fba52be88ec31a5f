// ============================================================================
// Structure : App
// ============================================================================
// État global de l'application TUI. Tous les composants de l'UI lisent
// depuis App ; toutes les modifications passent par ses méthodes.
//
// Le pipeline n'a que deux états visibles de l'extérieur : « en attente de
// ticker » (avertissement, rien d'autre) et « ticker fourni » (chargement
// puis rendu, ou erreur si le fetch revient vide).
// ============================================================================

use std::sync::Arc;

use crate::models::{ForecastFrame, PriceSeries};

/// Nombre d'années de prévision minimum
pub const MIN_YEARS: u8 = 1;

/// Nombre d'années de prévision maximum
pub const MAX_YEARS: u8 = 4;

/// Avertissement affiché tant qu'aucun ticker n'est saisi
pub const AWAITING_TICKER_WARNING: &str = "Please enter a stock symbol.";

/// Largeur minimale de la fenêtre visible du graphique brut (en barres)
const MIN_SPAN: usize = 30;

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Données brutes : tableau + graphique Open/Close
    Overview,

    /// Prévision : tableau + graphique avec bande d'incertitude
    Forecast,

    /// Décomposition : tendance, hebdomadaire, annuelle
    Components,

    /// Mode saisie du ticker (modal, Enter valide, ESC annule)
    InputMode,
}

/// Résultat d'une exécution complète du pipeline
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Historique normalisé (partagé avec le cache du loader)
    pub series: Arc<PriceSeries>,

    /// Prévision recalculée pour ce run
    pub forecast: ForecastFrame,
}

/// État du pipeline fetch -> fit -> predict
#[derive(Debug, Clone)]
pub enum PipelineState {
    /// Aucun ticker saisi : seul l'avertissement est affiché
    AwaitingTicker,

    /// Dernier run réussi
    Ready(PipelineOutput),

    /// Dernier run en échec ; le message est affiché tel quel
    Failed(String),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Ticker courant (vide = en attente)
    pub ticker: String,

    /// Années de prévision, dans [1, 4]
    pub years: u8,

    /// Écran actuellement affiché
    pub screen: Screen,

    /// Sortie (ou échec) du dernier run du pipeline
    pub pipeline: PipelineState,

    /// Deux pressions de 'q' pour quitter (évite les sorties accidentelles)
    pub confirm_quit: bool,

    /// Un run est en cours dans le worker
    pub is_loading: bool,

    /// Message de statut pendant le chargement
    pub loading_message: Option<String>,

    /// Buffer de saisie du mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input
    pub input_prompt: String,

    /// Fenêtre visible du graphique brut, en barres (0 = tout l'historique)
    raw_span: usize,

    /// Décalage de la fenêtre depuis la fin de l'historique, en barres
    raw_pan: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            ticker: String::new(),
            years: MIN_YEARS,
            screen: Screen::Overview,
            pipeline: PipelineState::AwaitingTicker,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
            raw_span: 0,
            raw_pan: 0,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Entrées du pipeline (ticker, années)
    // ========================================================================

    /// Remplace le ticker courant et réarme la fenêtre du graphique
    pub fn set_ticker(&mut self, ticker: String) {
        self.ticker = ticker;
        self.raw_span = 0;
        self.raw_pan = 0;
    }

    /// Un ticker a-t-il été fourni ?
    pub fn has_ticker(&self) -> bool {
        !self.ticker.is_empty()
    }

    /// Incrémente les années de prévision ; true si la valeur a changé
    pub fn years_up(&mut self) -> bool {
        if self.years < MAX_YEARS {
            self.years += 1;
            true
        } else {
            false
        }
    }

    /// Décrémente les années de prévision ; true si la valeur a changé
    pub fn years_down(&mut self) -> bool {
        if self.years > MIN_YEARS {
            self.years -= 1;
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Transitions du pipeline
    // ========================================================================

    pub fn set_ready(&mut self, output: PipelineOutput) {
        self.pipeline = PipelineState::Ready(output);
    }

    pub fn set_failed(&mut self, message: String) {
        self.pipeline = PipelineState::Failed(message);
    }

    /// Sortie du dernier run réussi, si disponible
    pub fn output(&self) -> Option<&PipelineOutput> {
        match &self.pipeline {
            PipelineState::Ready(output) => Some(output),
            _ => None,
        }
    }

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    pub fn show_overview(&mut self) {
        self.screen = Screen::Overview;
    }

    pub fn show_forecast(&mut self) {
        self.screen = Screen::Forecast;
    }

    pub fn show_components(&mut self) {
        self.screen = Screen::Components;
    }

    /// Passe à la vue suivante (Overview -> Forecast -> Components -> ...)
    pub fn next_view(&mut self) {
        self.screen = match self.screen {
            Screen::Overview => Screen::Forecast,
            Screen::Forecast => Screen::Components,
            Screen::Components => Screen::Overview,
            Screen::InputMode => Screen::InputMode,
        };
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.screen == Screen::InputMode
    }

    // ========================================================================
    // Confirmation de sortie (two-step quit)
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Mode saisie du ticker
    // ========================================================================

    pub fn start_input(&mut self, prompt: String) {
        self.screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    pub fn cancel_input(&mut self) {
        self.screen = Screen::Overview;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Récupère la saisie et retourne à la vue Overview
    pub fn submit_input(&mut self) -> String {
        let value = self.input_buffer.clone();
        self.screen = Screen::Overview;
        self.input_buffer.clear();
        self.input_prompt.clear();
        value
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    // ========================================================================
    // Fenêtre visible du graphique brut (équivalent du range-slider)
    // ========================================================================

    /// Indices [start, end) des barres visibles pour `total` barres
    pub fn visible_range(&self, total: usize) -> (usize, usize) {
        if total == 0 {
            return (0, 0);
        }

        let span = if self.raw_span == 0 {
            total
        } else {
            self.raw_span.min(total)
        };
        let max_pan = total - span;
        let pan = self.raw_pan.min(max_pan);

        let end = total - pan;
        (end - span, end)
    }

    /// Rétrécit la fenêtre visible (zoom avant)
    pub fn zoom_in(&mut self, total: usize) {
        let (start, end) = self.visible_range(total);
        let span = end - start;
        if span > MIN_SPAN {
            self.raw_span = (span / 2).max(MIN_SPAN);
        }
    }

    /// Élargit la fenêtre visible (zoom arrière)
    pub fn zoom_out(&mut self, total: usize) {
        let (start, end) = self.visible_range(total);
        let span = end - start;
        let doubled = span.saturating_mul(2);
        if doubled >= total {
            // Retour à l'historique complet
            self.raw_span = 0;
            self.raw_pan = 0;
        } else {
            self.raw_span = doubled;
        }
    }

    /// Fait glisser la fenêtre vers le passé
    pub fn pan_back(&mut self, total: usize) {
        let (start, end) = self.visible_range(total);
        let span = end - start;
        if span < total {
            let step = (span / 4).max(1);
            self.raw_pan = (self.raw_pan + step).min(total - span);
        }
    }

    /// Fait glisser la fenêtre vers le présent
    pub fn pan_forward(&mut self, total: usize) {
        let (start, end) = self.visible_range(total);
        let step = ((end - start) / 4).max(1);
        self.raw_pan = self.raw_pan.saturating_sub(step);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(!app.has_ticker());
        assert_eq!(app.years, MIN_YEARS);
        assert!(matches!(app.pipeline, PipelineState::AwaitingTicker));
        assert_eq!(app.screen, Screen::Overview);
    }

    #[test]
    fn test_years_clamped_to_bounds() {
        let mut app = App::new();

        // Borne basse : 1
        assert!(!app.years_down());
        assert_eq!(app.years, 1);

        // Monte jusqu'à 4, pas au-delà
        assert!(app.years_up());
        assert!(app.years_up());
        assert!(app.years_up());
        assert_eq!(app.years, 4);
        assert!(!app.years_up());
        assert_eq!(app.years, 4);

        assert!(app.years_down());
        assert_eq!(app.years, 3);
    }

    #[test]
    fn test_view_cycle() {
        let mut app = App::new();
        assert_eq!(app.screen, Screen::Overview);

        app.next_view();
        assert_eq!(app.screen, Screen::Forecast);
        app.next_view();
        assert_eq!(app.screen, Screen::Components);
        app.next_view();
        assert_eq!(app.screen, Screen::Overview);
    }

    #[test]
    fn test_input_mode_flow() {
        let mut app = App::new();

        app.start_input("Ticker: ".to_string());
        assert!(app.is_in_input_mode());

        app.append_char('a');
        app.append_char('a');
        app.append_char('x');
        app.backspace();
        app.append_char('p');
        app.append_char('l');

        let value = app.submit_input();
        assert_eq!(value, "aapl");
        assert!(!app.is_in_input_mode());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_cancel_input_clears_buffer() {
        let mut app = App::new();
        app.start_input("Ticker: ".to_string());
        app.append_char('g');
        app.cancel_input();

        assert!(!app.is_in_input_mode());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_visible_range_full_by_default() {
        let app = App::new();
        assert_eq!(app.visible_range(100), (0, 100));
        assert_eq!(app.visible_range(0), (0, 0));
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut app = App::new();
        let total = 400;

        app.zoom_in(total);
        assert_eq!(app.visible_range(total), (200, 400));

        app.zoom_in(total);
        assert_eq!(app.visible_range(total), (300, 400));

        // Glisse vers le passé d'un quart de fenêtre (100 / 4 = 25)
        app.pan_back(total);
        assert_eq!(app.visible_range(total), (275, 375));

        app.pan_forward(total);
        assert_eq!(app.visible_range(total), (300, 400));

        // Zoom arrière jusqu'à revenir à l'historique complet
        app.zoom_out(total);
        app.zoom_out(total);
        assert_eq!(app.visible_range(total), (0, 400));
    }

    #[test]
    fn test_zoom_respects_minimum_span() {
        let mut app = App::new();
        for _ in 0..10 {
            app.zoom_in(400);
        }
        let (start, end) = app.visible_range(400);
        assert!(end - start >= 30);
    }

    #[test]
    fn test_set_ticker_resets_window() {
        let mut app = App::new();
        app.zoom_in(400);
        app.pan_back(400);

        app.set_ticker("GOOG".to_string());
        assert_eq!(app.visible_range(400), (0, 400));
    }
}
