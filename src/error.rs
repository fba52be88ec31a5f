// ============================================================================
// Erreurs typées du pipeline
// ============================================================================
// Le pipeline ne laisse pas remonter d'erreurs brutes de librairies : chaque
// étape (fetch, chargement, modèle) expose sa propre taxonomie. Les messages
// sont affichés tels quels dans le panneau d'erreur de l'UI.
// ============================================================================

use thiserror::Error;

/// Erreurs de la couche HTTP vers Yahoo Finance
#[derive(Error, Debug)]
pub enum FetchError {
    /// La requête elle-même a échoué (réseau, DNS, timeout, JSON invalide)
    #[error("HTTP request to Yahoo Finance failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Yahoo a répondu avec un statut d'erreur
    #[error("Yahoo Finance returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// Réponse 200 mais structure inattendue
    #[error("unexpected Yahoo Finance response: {0}")]
    Malformed(String),
}

/// Erreurs du Data Loader
///
/// `NoData` est le seul cas explicitement géré par le pipeline : son message
/// est le texte exact montré à l'utilisateur (le forecast n'est alors jamais
/// calculé).
#[derive(Error, Debug)]
pub enum DataError {
    /// Résultat vide pour ce ticker (symbole inconnu ou sans historique)
    #[error("No data found for the ticker symbol: {0}")]
    NoData(String),

    /// Erreur de transport ou de parsing, propagée telle quelle
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Erreurs du modèle de prévision
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Moins de deux dates distinctes : impossible d'ajuster une tendance
    #[error("not enough data to fit a forecast: {points} distinct date(s), at least 2 required")]
    InsufficientData { points: usize },

    /// Le système des moindres carrés n'a pas de solution (données dégénérées)
    #[error("model fitting failed: {0}")]
    Fit(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_message_names_ticker() {
        // Le message doit nommer le ticker, mot pour mot
        let err = DataError::NoData("ZZZZINVALID".to_string());
        assert_eq!(
            err.to_string(),
            "No data found for the ticker symbol: ZZZZINVALID"
        );
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = ForecastError::InsufficientData { points: 1 };
        assert!(err.to_string().contains("1 distinct date(s)"));
    }
}
