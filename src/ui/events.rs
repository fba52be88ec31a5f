// ============================================================================
// Gestion des événements
// ============================================================================
// Lecture des événements clavier (poll avec timeout) et helpers de
// classification utilisés par l'event loop de main.rs.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'événement pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements (stateless)
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant, timeout 250ms)
    ///
    /// Seuls les `Press` sont retenus : certains OS envoient aussi les
    /// Release, ce qui doublerait chaque frappe.
    pub fn next(&self) -> Result<Event> {
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        Ok(Event::Tick)
                    }
                }
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : classification des touches
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    if let Event::Key(key) = event {
        Some(key.code)
    } else {
        None
    }
}

/// 'q' : quitter (avec confirmation two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

/// Entrée
pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// 't' : saisir un nouveau ticker
pub fn is_ticker_input_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('t') | KeyCode::Char('T')))
}

/// Tab : vue suivante (Overview -> Forecast -> Components)
pub fn is_next_view_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

/// '1' : vue données brutes
pub fn is_overview_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('1')))
}

/// '2' : vue prévision
pub fn is_forecast_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('2')))
}

/// '3' : vue décomposition
pub fn is_components_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('3')))
}

/// Flèche gauche : une année de prévision en moins
pub fn is_years_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left))
}

/// Flèche droite : une année de prévision en plus
pub fn is_years_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right))
}

/// 'l' : zoom avant sur le graphique brut
pub fn is_zoom_in_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('l')))
}

/// 'h' : zoom arrière sur le graphique brut
pub fn is_zoom_out_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h')))
}

/// '[' : fenêtre vers le passé
pub fn is_pan_back_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('[')))
}

/// ']' : fenêtre vers le présent
pub fn is_pan_forward_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(']')))
}

/// Caractère valide pour un symbole de ticker (alphanumérique, '-', '.', '^', '=')
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_alphanumeric() || matches!(c, '-' | '.' | '^' | '=')
    )
}

/// Extrait le caractère d'un événement clavier
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Some(KeyCode::Char(c)) = key_code(event) {
        Some(c)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(is_quit_event(&key(KeyCode::Char('Q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_years_events() {
        assert!(is_years_down_event(&key(KeyCode::Left)));
        assert!(is_years_up_event(&key(KeyCode::Right)));
        assert!(!is_years_up_event(&key(KeyCode::Left)));
    }

    #[test]
    fn test_view_events() {
        assert!(is_next_view_event(&key(KeyCode::Tab)));
        assert!(is_overview_event(&key(KeyCode::Char('1'))));
        assert!(is_forecast_event(&key(KeyCode::Char('2'))));
        assert!(is_components_event(&key(KeyCode::Char('3'))));
    }

    #[test]
    fn test_ticker_char_event() {
        assert!(is_ticker_char_event(&key(KeyCode::Char('A'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('-'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('^'))));
        assert!(!is_ticker_char_event(&key(KeyCode::Char(' '))));
        assert!(!is_ticker_char_event(&key(KeyCode::Enter)));
    }

    #[test]
    fn test_get_char_from_event() {
        assert_eq!(get_char_from_event(&key(KeyCode::Char('x'))), Some('x'));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
        assert_eq!(get_char_from_event(&Event::Tick), None);
    }
}
