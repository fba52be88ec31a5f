// ============================================================================
// Module : models
// ============================================================================
// Structures de données du pipeline : historique de prix normalisé,
// frame d'entraînement et frame de prévision.
// ============================================================================

pub mod forecast;     // ForecastRow, ForecastFrame (sortie du modèle)
pub mod price_series; // DailyBar, PriceSeries, TrainingFrame

// Re-exports pour simplifier les imports
pub use forecast::{ForecastFrame, ForecastRow};
pub use price_series::{DailyBar, PriceSeries, TrainingFrame};
