// ============================================================================
// Modèle additif : tendance + saisonnalité hebdomadaire + annuelle
// ============================================================================
// Ajuste y(t) = trend(t) + weekly(t) + yearly(t) par moindres carrés :
// - trend : droite (ordonnée à l'origine + pente sur le temps normalisé)
// - weekly : termes de Fourier d'ordre 2 sur une période de 7 jours
// - yearly : termes de Fourier d'ordre 3 sur une période de 365.25 jours
//
// La bande d'incertitude est la prévision ponctuelle ± 1.96 fois l'écart-type
// des résidus d'entraînement.
//
// Une frame dégénérée (moins de deux dates distinctes) est une erreur typée,
// jamais un panic qui remonte jusqu'à l'UI.
// ============================================================================

use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument};

use crate::error::ForecastError;
use crate::models::{ForecastRow, TrainingFrame};

use super::linalg;

/// Période de la saisonnalité annuelle, en jours
const YEARLY_PERIOD: f64 = 365.25;

/// Période de la saisonnalité hebdomadaire, en jours
const WEEKLY_PERIOD: f64 = 7.0;

/// Ordre de Fourier hebdomadaire (2 harmoniques -> 4 coefficients)
const WEEKLY_ORDER: usize = 2;

/// Ordre de Fourier annuel (3 harmoniques -> 6 coefficients)
const YEARLY_ORDER: usize = 3;

/// Nombre total de coefficients : intercept + pente + Fourier
const NUM_FEATURES: usize = 2 + 2 * WEEKLY_ORDER + 2 * YEARLY_ORDER;

/// Quantile normal à 95% pour la bande d'incertitude
const BAND_Z: f64 = 1.96;

/// Régularisation ridge sur la diagonale des équations normales
/// (stabilise le système quand l'historique est très court)
const RIDGE: f64 = 1e-8;

/// Modèle additif ajusté sur une TrainingFrame
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    /// Date d'origine de l'axe temporel (t = 0)
    origin: NaiveDate,

    /// Dernière date observée à l'entraînement
    train_end: NaiveDate,

    /// Normalisation du temps pour la pente (jours entre origin et train_end)
    scale: f64,

    /// Coefficients : [intercept, pente, weekly sin/cos..., yearly sin/cos...]
    beta: Vec<f64>,

    /// Écart-type des résidus d'entraînement
    sigma: f64,
}

impl AdditiveModel {
    /// Ajuste le modèle sur la frame (date, valeur)
    ///
    /// # Erreurs
    /// * `InsufficientData` si la frame compte moins de deux dates distinctes
    /// * `Fit` si les équations normales sont singulières
    #[instrument(skip(frame), fields(points = frame.len()))]
    pub fn fit(frame: &TrainingFrame) -> Result<Self, ForecastError> {
        let distinct = frame.distinct_dates();
        if distinct < 2 {
            return Err(ForecastError::InsufficientData { points: distinct });
        }

        // L'appelant fournit la frame triée ; first/last existent (distinct >= 2)
        let origin = frame.first_date().expect("frame non vide");
        let train_end = frame.last_date().expect("frame non vide");
        let scale = ((train_end - origin).num_days() as f64).max(1.0);

        // Accumule XᵀX et Xᵀy ligne par ligne (pas besoin de matérialiser X)
        let mut xtx = vec![vec![0.0; NUM_FEATURES]; NUM_FEATURES];
        let mut xty = vec![0.0; NUM_FEATURES];

        for &(date, value) in &frame.points {
            let t = (date - origin).num_days() as f64;
            let row = features(t, scale);
            for i in 0..NUM_FEATURES {
                xty[i] += row[i] * value;
                for j in 0..NUM_FEATURES {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }

        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += RIDGE;
        }

        let beta = linalg::solve(xtx, xty)
            .ok_or_else(|| ForecastError::Fit("singular normal equations".to_string()))?;

        // Écart-type des résidus, corrigé des degrés de liberté quand possible
        let n = frame.len();
        let mut rss = 0.0;
        for &(date, value) in &frame.points {
            let t = (date - origin).num_days() as f64;
            let row = features(t, scale);
            let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
            rss += (value - fitted) * (value - fitted);
        }
        let dof = n.saturating_sub(NUM_FEATURES).max(1);
        let sigma = (rss / dof as f64).sqrt();

        debug!(points = n, sigma, "Additive model fitted");

        Ok(Self {
            origin,
            train_end,
            scale,
            beta,
            sigma,
        })
    }

    /// Prédit chaque date calendaire de l'origine jusqu'à
    /// `train_end + horizon_days` inclus
    pub fn predict(&self, horizon_days: u32) -> Vec<ForecastRow> {
        let last = self.train_end + Duration::days(horizon_days as i64);
        let total = (last - self.origin).num_days() + 1;

        let mut rows = Vec::with_capacity(total as usize);
        for offset in 0..total {
            let date = self.origin + Duration::days(offset);
            rows.push(self.predict_row(date));
        }
        rows
    }

    /// Prévision pour une seule date
    pub fn predict_row(&self, date: NaiveDate) -> ForecastRow {
        let t = (date - self.origin).num_days() as f64;
        let row = features(t, self.scale);

        let trend = self.beta[0] * row[0] + self.beta[1] * row[1];

        let weekly_end = 2 + 2 * WEEKLY_ORDER;
        let weekly: f64 = (2..weekly_end).map(|i| self.beta[i] * row[i]).sum();
        let yearly: f64 = (weekly_end..NUM_FEATURES)
            .map(|i| self.beta[i] * row[i])
            .sum();

        let yhat = trend + weekly + yearly;
        let band = BAND_Z * self.sigma;

        ForecastRow {
            date,
            yhat,
            yhat_lower: yhat - band,
            yhat_upper: yhat + band,
            trend,
            weekly,
            yearly,
        }
    }

    /// Écart-type des résidus d'entraînement
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

/// Ligne de la matrice de design pour un temps `t` (en jours depuis l'origine)
fn features(t: f64, scale: f64) -> [f64; NUM_FEATURES] {
    let mut row = [0.0; NUM_FEATURES];
    row[0] = 1.0;
    row[1] = t / scale;

    let mut idx = 2;
    for k in 1..=WEEKLY_ORDER {
        let angle = 2.0 * std::f64::consts::PI * (k as f64) * t / WEEKLY_PERIOD;
        row[idx] = angle.sin();
        row[idx + 1] = angle.cos();
        idx += 2;
    }
    for k in 1..=YEARLY_ORDER {
        let angle = 2.0 * std::f64::consts::PI * (k as f64) * t / YEARLY_PERIOD;
        row[idx] = angle.sin();
        row[idx + 1] = angle.cos();
        idx += 2;
    }

    row
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

    /// Frame de `n` jours consécutifs générée par `f(t)`
    fn synthetic_frame(n: i64, f: impl Fn(f64) -> f64) -> TrainingFrame {
        let start = date(2023, 1, 2);
        TrainingFrame {
            points: (0..n)
                .map(|t| (start + Duration::days(t), f(t as f64)))
                .collect(),
        }
    }

    #[test]
    fn test_fit_empty_frame() {
        let frame = TrainingFrame { points: Vec::new() };
        match AdditiveModel::fit(&frame) {
            Err(ForecastError::InsufficientData { points }) => assert_eq!(points, 0),
            other => panic!("attendu InsufficientData, obtenu {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_fit_single_date() {
        // Deux points mais une seule date distincte : toujours dégénéré
        let d = date(2023, 1, 2);
        let frame = TrainingFrame {
            points: vec![(d, 100.0), (d, 101.0)],
        };
        match AdditiveModel::fit(&frame) {
            Err(ForecastError::InsufficientData { points }) => assert_eq!(points, 1),
            other => panic!("attendu InsufficientData, obtenu {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_fit_two_points_predicts_full_range() {
        let frame = synthetic_frame(2, |t| 100.0 + t);
        let model = AdditiveModel::fit(&frame).unwrap();

        let rows = model.predict(365);
        // 2 jours d'historique + 365 jours d'horizon = 367 dates
        assert_eq!(rows.len(), 367);
        assert_eq!(rows.first().unwrap().date, date(2023, 1, 2));
        assert_eq!(
            rows.last().unwrap().date,
            date(2023, 1, 3) + Duration::days(365)
        );
    }

    #[test]
    fn test_linear_trend_recovery() {
        // Données purement linéaires : la pente doit être extrapolée
        let frame = synthetic_frame(300, |t| 50.0 + 0.5 * t);
        let model = AdditiveModel::fit(&frame).unwrap();

        let rows = model.predict(60);
        assert_eq!(rows.len(), 360);

        for (t, row) in rows.iter().enumerate() {
            let expected = 50.0 + 0.5 * t as f64;
            assert!(
                (row.yhat - expected).abs() < 0.5,
                "t={} yhat={} attendu={}",
                t,
                row.yhat,
                expected
            );
        }

        // Résidus quasi nuls => bande très serrée
        let last = rows.last().unwrap();
        assert!(last.yhat_upper - last.yhat_lower < 0.1);
    }

    #[test]
    fn test_weekly_seasonality_recovery() {
        let signal = |t: f64| 100.0 + 10.0 * (2.0 * std::f64::consts::PI * t / 7.0).sin();
        let frame = synthetic_frame(280, signal);
        let model = AdditiveModel::fit(&frame).unwrap();

        // Vérifie l'extrapolation sur des dates futures
        let rows = model.predict(28);
        for (t, row) in rows.iter().enumerate().skip(280) {
            let expected = signal(t as f64);
            assert!(
                (row.yhat - expected).abs() < 0.5,
                "t={} yhat={} attendu={}",
                t,
                row.yhat,
                expected
            );
        }
    }

    #[test]
    fn test_band_brackets_point_forecast() {
        let frame = synthetic_frame(100, |t| 200.0 + t + (t * 0.7).sin() * 5.0);
        let model = AdditiveModel::fit(&frame).unwrap();

        for row in model.predict(30) {
            assert!(row.yhat_lower <= row.yhat);
            assert!(row.yhat <= row.yhat_upper);
        }
    }

    #[test]
    fn test_components_sum_to_yhat() {
        let frame = synthetic_frame(150, |t| 80.0 + 0.2 * t);
        let model = AdditiveModel::fit(&frame).unwrap();

        for row in model.predict(10) {
            let sum = row.trend + row.weekly + row.yearly;
            assert!((row.yhat - sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sigma_non_negative() {
        let frame = synthetic_frame(50, |t| 10.0 + t);
        let model = AdditiveModel::fit(&frame).unwrap();
        assert!(model.sigma() >= 0.0);
    }
}
