//! Catalog Snapshot: films and world quotes fetched once at startup and
//! shared read-only by the quiz, the oracle and the grid.

use std::sync::Arc;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use unicode_normalization::UnicodeNormalization;

use crate::api::GhibliApi;
use crate::config::ApiConfig;
use crate::models::{Film, WorldSnapshot};

/// Lowercase, decompose and drop combining diacritics (U+0300..=U+036F),
/// so "Pönyo" and "PONYO" share the key "ponyo".
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Case- and diacritic-insensitive exact title lookup.
pub fn find_by_title<'a>(films: &'a [Film], title: &str) -> Option<&'a Film> {
    let target = normalize(title);
    films.iter().find(|f| normalize(&f.title) == target)
}

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    films: Arc<Vec<Film>>,
    world: Option<Arc<WorldSnapshot>>,
}

impl CatalogSnapshot {
    pub fn new(films: Vec<Film>, world: Option<WorldSnapshot>) -> Self {
        Self {
            films: Arc::new(films),
            world: world.map(Arc::new),
        }
    }

    pub fn films(&self) -> &[Film] {
        &self.films
    }

    pub fn world(&self) -> Option<&WorldSnapshot> {
        self.world.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.films.is_empty()
    }

    /// Fetch movies and world quotes concurrently. Each side degrades to
    /// empty on its own failure without affecting the other.
    pub async fn load(api: &dyn GhibliApi, config: &ApiConfig) -> Self {
        let (films, world) = tokio::join!(
            fetch_with_retry("movies", config, || api.movies()),
            fetch_with_retry("world", config, || api.world()),
        );

        let films = films.unwrap_or_default();
        tracing::info!(
            films = films.len(),
            quotes = world.as_ref().map(|w| w.quotes.len()).unwrap_or(0),
            "Catalog snapshot loaded"
        );
        Self::new(films, world)
    }
}

/// Delays between snapshot attempts: `retry_delay_ms` first, doubling after,
/// capped at five seconds.
fn backoff(config: &ApiConfig) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor((config.retry_delay_ms / 2).max(1))
        .max_delay(Duration::from_secs(5))
        .take(config.max_retries)
}

async fn fetch_with_retry<T, F, Fut>(what: &str, config: &ApiConfig, action: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, crate::api::ApiError>>,
{
    match Retry::spawn(backoff(config).map(jitter), action).await {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(
                endpoint = what,
                error = %e,
                "Snapshot fetch failed, continuing with an empty snapshot"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(title: &str) -> Film {
        Film {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_strips_case_and_diacritics() {
        assert_eq!(normalize("PONYO"), "ponyo");
        assert_eq!(normalize("Pönyo"), "ponyo");
        assert_eq!(
            normalize("Nausicaä of the Valley of the Wind"),
            "nausicaa of the valley of the wind"
        );
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn find_by_title_is_exact_after_normalizing() {
        let films = vec![film("Nausicaa of the Valley of the Wind"), film("Ponyo")];
        assert!(find_by_title(&films, "Nausicaä of the Valley of the Wind").is_some());
        assert!(find_by_title(&films, "ponyo").is_some());
        // No substring matching
        assert!(find_by_title(&films, "Pony").is_none());
    }

    #[test]
    fn backoff_starts_at_the_configured_delay_and_doubles() {
        let config = ApiConfig {
            max_retries: 4,
            retry_delay_ms: 200,
            ..Default::default()
        };
        let delays: Vec<u128> = backoff(&config).map(|d| d.as_millis()).collect();
        assert_eq!(delays, vec![200, 400, 800, 1600]);

        let config = ApiConfig {
            max_retries: 8,
            retry_delay_ms: 1000,
            ..Default::default()
        };
        assert_eq!(backoff(&config).last(), Some(Duration::from_secs(5)));

        let config = ApiConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(backoff(&config).count(), 0);
    }
}
