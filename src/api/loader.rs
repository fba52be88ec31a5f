// ============================================================================
// Data Loader : fetch mémoïsé des séries de prix
// ============================================================================
// Enveloppe le client Yahoo avec un cache qui vit aussi longtemps que le
// processus : deux demandes du même ticker renvoient la même série sans
// second appel réseau.
//
// La clé de cache est (ticker, date du fetch) et pas le ticker seul :
// « aujourd'hui » avance alors qu'un cache par ticker seul servirait une
// série périmée après minuit. Dans la même journée, le comportement est
// identique à une mémoïsation par ticker.
// ============================================================================

use std::sync::{Arc, Mutex};

use cached::{Cached, SizedCache};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::DataError;
use crate::models::PriceSeries;

use super::yahoo;

/// Nombre maximum de séries gardées en mémoire
const CACHE_SIZE: usize = 32;

/// Clé de cache : un ticker, un jour de fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    symbol: String,
    fetched_on: NaiveDate,
}

impl CacheKey {
    fn today(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            fetched_on: Utc::now().date_naive(),
        }
    }
}

/// Chargeur de données avec mémoïsation par (ticker, jour)
///
/// Les séries sont partagées en `Arc` : un hit de cache ne copie rien.
pub struct DataLoader {
    cache: Mutex<SizedCache<CacheKey, Arc<PriceSeries>>>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(SizedCache::with_size(CACHE_SIZE)),
        }
    }

    /// Renvoie l'historique journalier du ticker, depuis le cache si possible
    pub async fn load(&self, symbol: &str) -> Result<Arc<PriceSeries>, DataError> {
        if let Some(series) = self.lookup(symbol) {
            debug!(ticker = %symbol, bars = series.len(), "Cache hit");
            return Ok(series);
        }

        let series = Arc::new(yahoo::fetch_daily_history(symbol).await?);

        let key = CacheKey::today(symbol);
        self.cache
            .lock()
            .unwrap()
            .cache_set(key, Arc::clone(&series));

        info!(ticker = %symbol, bars = series.len(), "Series cached");
        Ok(series)
    }

    /// Consulte le cache pour le ticker, sur la clé du jour
    fn lookup(&self, symbol: &str) -> Option<Arc<PriceSeries>> {
        let key = CacheKey::today(symbol);
        self.cache.lock().unwrap().cache_get(&key).cloned()
    }

    /// Insère une série dans le cache à une date de fetch donnée (tests)
    #[cfg(test)]
    fn prime_at(&self, symbol: &str, fetched_on: NaiveDate, series: PriceSeries) {
        let key = CacheKey {
            symbol: symbol.to_string(),
            fetched_on,
        };
        self.cache.lock().unwrap().cache_set(key, Arc::new(series));
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyBar;
    use chrono::Duration;

    fn fake_series(symbol: &str) -> PriceSeries {
        let mut series = PriceSeries::new(symbol.to_string());
        series.add_bar(DailyBar::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            10.0,
            11.0,
            9.0,
            10.5,
            500,
        ));
        series.add_bar(DailyBar::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            10.5,
            12.0,
            10.0,
            11.5,
            600,
        ));
        series
    }

    #[tokio::test]
    async fn test_load_returns_cached_series_without_fetch() {
        // Série insérée sous la clé du jour : load() doit la renvoyer telle
        // quelle, sans toucher au réseau (le fetch échouerait ici)
        let loader = DataLoader::new();
        let today = Utc::now().date_naive();
        loader.prime_at("FAKE", today, fake_series("FAKE"));

        let first = loader.load("FAKE").await.unwrap();
        let second = loader.load("FAKE").await.unwrap();

        assert_eq!(first.len(), 2);
        // Même contenu, même allocation partagée
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lookup_ignores_stale_entries() {
        // Une entrée datée d'hier ne doit pas servir aujourd'hui
        let loader = DataLoader::new();
        let yesterday = Utc::now().date_naive() - Duration::days(1);
        loader.prime_at("FAKE", yesterday, fake_series("FAKE"));

        assert!(loader.lookup("FAKE").is_none());
    }

    #[test]
    fn test_lookup_is_per_ticker() {
        let loader = DataLoader::new();
        let today = Utc::now().date_naive();
        loader.prime_at("AAPL", today, fake_series("AAPL"));

        assert!(loader.lookup("AAPL").is_some());
        assert!(loader.lookup("TSLA").is_none());
    }
}
