// ============================================================================
// Structures : ForecastRow, ForecastFrame
// ============================================================================
// Sortie du modèle additif : une ligne par date calendaire, de la première
// date observée jusqu'à la dernière date observée + horizon. Chaque ligne
// porte la prévision ponctuelle, la bande d'incertitude et la décomposition
// en composantes (tendance, hebdomadaire, annuelle).
//
// Recalculée à chaque exécution du pipeline, jamais mise en cache.
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Une prévision pour une date donnée
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Date prédite
    pub date: NaiveDate,

    /// Prévision ponctuelle
    pub yhat: f64,

    /// Borne basse de la bande d'incertitude
    pub yhat_lower: f64,

    /// Borne haute de la bande d'incertitude
    pub yhat_upper: f64,

    /// Composante de tendance (lente)
    pub trend: f64,

    /// Composante saisonnière hebdomadaire
    pub weekly: f64,

    /// Composante saisonnière annuelle
    pub yearly: f64,
}

/// Prévision complète : historique + futur
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFrame {
    /// Symbole du ticker prédit
    pub symbol: String,

    /// Horizon en jours calendaires (years * 365)
    pub horizon_days: u32,

    /// Lignes triées par date croissante
    pub rows: Vec<ForecastRow>,
}

impl ForecastFrame {
    pub fn new(symbol: String, horizon_days: u32, rows: Vec<ForecastRow>) -> Self {
        Self {
            symbol,
            horizon_days,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }

    /// Dernière date prédite (= dernière date observée + horizon)
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Les `n` dernières lignes, pour le tableau « Predicted Data »
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// Borne basse minimale (pour caler l'axe Y du graphique)
    pub fn min_lower(&self) -> Option<f64> {
        self.rows
            .iter()
            .map(|r| r.yhat_lower)
            .min_by(|a, b| a.partial_cmp(b).unwrap())
    }

    /// Borne haute maximale
    pub fn max_upper(&self) -> Option<f64> {
        self.rows
            .iter()
            .map(|r| r.yhat_upper)
            .max_by(|a, b| a.partial_cmp(b).unwrap())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(d: NaiveDate, yhat: f64) -> ForecastRow {
        ForecastRow {
            date: d,
            yhat,
            yhat_lower: yhat - 2.0,
            yhat_upper: yhat + 2.0,
            trend: yhat,
            weekly: 0.0,
            yearly: 0.0,
        }
    }

    #[test]
    fn test_frame_bounds() {
        let frame = ForecastFrame::new(
            "AAPL".to_string(),
            365,
            vec![
                row(date(2024, 1, 1), 100.0),
                row(date(2024, 1, 2), 102.0),
                row(date(2024, 1, 3), 101.0),
            ],
        );

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.last_date(), Some(date(2024, 1, 3)));
        assert_eq!(frame.min_lower(), Some(98.0));
        assert_eq!(frame.max_upper(), Some(104.0));
    }

    #[test]
    fn test_frame_tail() {
        let rows: Vec<ForecastRow> = (1..=10)
            .map(|d| row(date(2024, 1, d), 100.0 + d as f64))
            .collect();
        let frame = ForecastFrame::new("AAPL".to_string(), 365, rows);

        let tail = frame.tail(5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].date, date(2024, 1, 6));
    }

    #[test]
    fn test_empty_frame() {
        let frame = ForecastFrame::new("AAPL".to_string(), 730, Vec::new());
        assert!(frame.is_empty());
        assert!(frame.last_date().is_none());
        assert!(frame.min_lower().is_none());
    }
}
