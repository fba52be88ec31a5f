// ============================================================================
// Module : api
// ============================================================================
// Récupération des données de marché : client Yahoo Finance et Data Loader
// mémoïsé par-dessus.
// ============================================================================

pub mod loader; // Cache par (ticker, jour de fetch)
pub mod yahoo;  // Client API Yahoo Finance (barres journalières)

// Re-export des entrées principales
pub use loader::DataLoader;
pub use yahoo::fetch_daily_history;
