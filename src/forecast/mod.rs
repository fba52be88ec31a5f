// ============================================================================
// Module : forecast
// ============================================================================
// L'étape « Forecaster » du pipeline : projette la série de clôtures en
// (date, valeur), ajuste le modèle additif et prédit `years * 365` jours
// au-delà de la dernière date observée.
// ============================================================================

pub mod linalg; // Résolution des équations normales
pub mod model;  // Modèle additif tendance + saisonnalités

pub use model::AdditiveModel;

use tracing::info;

use crate::error::ForecastError;
use crate::models::{ForecastFrame, PriceSeries};

/// Nombre de jours d'horizon par année de prévision
pub const DAYS_PER_YEAR: u32 = 365;

/// Exécute l'étape de prévision complète pour une série de prix
///
/// Horizon = `years * 365` jours calendaires après la dernière date observée.
/// La frame retournée couvre tout l'historique plus le futur.
pub fn forecast_series(series: &PriceSeries, years: u8) -> Result<ForecastFrame, ForecastError> {
    let horizon_days = u32::from(years) * DAYS_PER_YEAR;

    let frame = series.training_frame();
    let model = AdditiveModel::fit(&frame)?;
    let rows = model.predict(horizon_days);

    info!(
        ticker = %series.symbol,
        years,
        horizon_days,
        rows = rows.len(),
        "Forecast computed"
    );

    Ok(ForecastFrame::new(series.symbol.clone(), horizon_days, rows))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyBar;
    use chrono::{Duration, NaiveDate};

    fn series_of(days: i64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut series = PriceSeries::new("AAPL".to_string());
        for t in 0..days {
            let d = start + Duration::days(t);
            let close = 100.0 + 0.3 * t as f64;
            series.add_bar(DailyBar::new(d, close - 0.5, close + 1.0, close - 1.0, close, 1000));
        }
        series
    }

    #[test]
    fn test_horizon_one_year() {
        let series = series_of(120);
        let frame = forecast_series(&series, 1).unwrap();

        assert_eq!(frame.horizon_days, 365);
        assert_eq!(
            frame.last_date().unwrap(),
            series.last_date().unwrap() + Duration::days(365)
        );
    }

    #[test]
    fn test_horizon_four_years() {
        let series = series_of(120);
        let frame = forecast_series(&series, 4).unwrap();

        assert_eq!(frame.horizon_days, 1460);
        assert_eq!(
            frame.last_date().unwrap(),
            series.last_date().unwrap() + Duration::days(1460)
        );
    }

    #[test]
    fn test_forecast_covers_history_plus_future() {
        let series = series_of(100);
        let frame = forecast_series(&series, 1).unwrap();

        // Première date prédite = première date observée
        assert_eq!(frame.rows.first().unwrap().date, series.first_date().unwrap());
        // 100 jours d'historique + 365 d'horizon = 465 dates
        assert_eq!(frame.len(), 465);
    }

    #[test]
    fn test_degenerate_series_is_typed_error() {
        let mut series = PriceSeries::new("NEW".to_string());
        series.add_bar(DailyBar::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            10.0,
            11.0,
            9.0,
            10.5,
            100,
        ));

        assert!(matches!(
            forecast_series(&series, 1),
            Err(ForecastError::InsufficientData { points: 1 })
        ));
    }
}
