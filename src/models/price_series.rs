// ============================================================================
// Structures : DailyBar, PriceSeries, TrainingFrame
// ============================================================================
// Une PriceSeries est l'historique journalier normalisé d'un ticker :
// une barre par jour de cotation, triée par date croissante, couvrant
// [2015-01-01, aujourd'hui]. La date est une colonne explicite (NaiveDate),
// pas un index implicite.
//
// La TrainingFrame est la projection (date, close) consommée par le modèle
// de prévision. Dérivée, jamais persistée.
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Une barre journalière (Open, High, Low, Close, Volume)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    /// Date de la barre (jour de cotation)
    pub date: NaiveDate,

    /// Prix d'ouverture
    pub open: f64,

    /// Prix le plus haut
    pub high: f64,

    /// Prix le plus bas
    pub low: f64,

    /// Prix de clôture
    pub close: f64,

    /// Volume échangé
    pub volume: u64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Variation en pourcentage entre l'ouverture et la clôture du jour
    pub fn change_percent(&self) -> f64 {
        if self.open == 0.0 {
            0.0
        } else {
            ((self.close - self.open) / self.open) * 100.0
        }
    }
}

/// Historique journalier complet d'un ticker
///
/// La série possède ses barres (Vec) ; tout est libéré d'un bloc au drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Symbole du ticker (ex: "AAPL")
    pub symbol: String,

    /// Barres journalières, triées par date croissante
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    /// Crée une série vide pour un symbole
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    /// Ajoute une barre (l'appelant garantit l'ordre chronologique)
    pub fn add_bar(&mut self, bar: DailyBar) {
        self.bars.push(bar);
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Barre la plus récente
    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    /// Première date observée
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// Dernière date observée
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Dernier prix de clôture (prix « actuel » affiché dans le header)
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Variation du dernier jour de cotation
    pub fn daily_change_percent(&self) -> Option<f64> {
        self.bars.last().map(|b| b.change_percent())
    }

    /// Prix minimum sur toute la période (sur les plus bas)
    pub fn min_price(&self) -> Option<f64> {
        self.bars
            .iter()
            .map(|b| b.low)
            .min_by(|a, b| a.partial_cmp(b).unwrap())
    }

    /// Prix maximum sur toute la période (sur les plus hauts)
    pub fn max_price(&self) -> Option<f64> {
        self.bars
            .iter()
            .map(|b| b.high)
            .max_by(|a, b| a.partial_cmp(b).unwrap())
    }

    /// Les `n` dernières barres (toutes si la série est plus courte)
    ///
    /// Utilisé pour le tableau « Raw data » (les dernières lignes).
    pub fn tail(&self, n: usize) -> &[DailyBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Projette la série en (date, close) pour le modèle de prévision
    pub fn training_frame(&self) -> TrainingFrame {
        TrainingFrame {
            points: self.bars.iter().map(|b| (b.date, b.close)).collect(),
        }
    }
}

/// Série (date, valeur) attendue par le modèle additif
#[derive(Debug, Clone)]
pub struct TrainingFrame {
    /// Paires (date, close), triées par date croissante
    pub points: Vec<(NaiveDate, f64)>,
}

impl TrainingFrame {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Nombre de dates distinctes (le modèle en exige au moins deux)
    pub fn distinct_dates(&self) -> usize {
        let mut count = 0;
        let mut prev: Option<NaiveDate> = None;
        for (date, _) in &self.points {
            if prev != Some(*date) {
                count += 1;
                prev = Some(*date);
            }
        }
        count
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

    fn sample_series() -> PriceSeries {
        let mut series = PriceSeries::new("AAPL".to_string());
        series.add_bar(DailyBar::new(date(2024, 1, 2), 100.0, 110.0, 95.0, 105.0, 1000));
        series.add_bar(DailyBar::new(date(2024, 1, 3), 105.0, 115.0, 100.0, 110.0, 1200));
        series.add_bar(DailyBar::new(date(2024, 1, 4), 110.0, 112.0, 104.0, 108.0, 900));
        series
    }

    #[test]
    fn test_series_basics() {
        let series = sample_series();
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert_eq!(series.first_date(), Some(date(2024, 1, 2)));
        assert_eq!(series.last_date(), Some(date(2024, 1, 4)));
        assert_eq!(series.last_close(), Some(108.0));
    }

    #[test]
    fn test_min_max_price() {
        let series = sample_series();
        assert_eq!(series.min_price(), Some(95.0));
        assert_eq!(series.max_price(), Some(115.0));
    }

    #[test]
    fn test_tail_shorter_than_series() {
        let series = sample_series();
        let tail = series.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].date, date(2024, 1, 3));
    }

    #[test]
    fn test_tail_longer_than_series() {
        let series = sample_series();
        assert_eq!(series.tail(10).len(), 3);
    }

    #[test]
    fn test_training_frame_projection() {
        let frame = sample_series().training_frame();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.points[0], (date(2024, 1, 2), 105.0));
        assert_eq!(frame.distinct_dates(), 3);
    }

    #[test]
    fn test_distinct_dates_with_duplicates() {
        let frame = TrainingFrame {
            points: vec![
                (date(2024, 1, 2), 100.0),
                (date(2024, 1, 2), 101.0),
                (date(2024, 1, 3), 102.0),
            ],
        };
        assert_eq!(frame.distinct_dates(), 2);
    }

    #[test]
    fn test_daily_change_percent() {
        let series = sample_series();
        // Dernière barre : open 110, close 108
        let change = series.daily_change_percent().unwrap();
        assert!((change - (-1.8181818)).abs() < 1e-4);
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("TSLA".to_string());
        assert!(series.is_empty());
        assert!(series.last_close().is_none());
        assert!(series.min_price().is_none());
        assert!(series.training_frame().is_empty());
    }
}
