// ============================================================================
// StockCast - Prévision de cours boursiers dans le terminal
// ============================================================================
// Pipeline : ticker + horizon -> fetch Yahoo Finance (mémoïsé) -> modèle
// additif (tendance + saisonnalités) -> rendu TUI (données brutes,
// prévision, décomposition).
// ============================================================================

pub mod api;      // Client Yahoo Finance et Data Loader mémoïsé
pub mod app;      // État global de l'application
pub mod error;    // Taxonomie d'erreurs (fetch, données, modèle)
pub mod forecast; // Modèle additif et prévision
pub mod models;   // Structures de données (séries, prévisions)
pub mod ui;       // Rendu terminal et événements
