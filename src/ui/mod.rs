// ============================================================================
// Module : ui
// ============================================================================
// Rendu terminal (ratatui) et gestion des événements clavier.
// ============================================================================

pub mod components_view; // Décomposition tendance / hebdo / annuelle
pub mod dashboard;       // Routeur de rendu principal
pub mod events;          // Événements clavier et classification
pub mod forecast_view;   // Prévision + bande d'incertitude
pub mod raw_view;        // Données brutes Open/Close

// Re-export des entrées principales
pub use dashboard::render;
pub use events::{Event, EventHandler};
