//! Lookup flow: geocode, serve from cache when fresh, otherwise fetch,
//! render and cache.

use std::sync::Arc;
use std::time::Duration;

use skycast_core::WeatherConfig;

use crate::cache::WeatherCache;
use crate::format::{cache_annotation, render_report};
use crate::geocode::Geocoder;
use crate::provider::WeatherProvider;
use crate::types::{CurrentConditions, Place, WeatherError};

/// Where a lookup's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Fresh,
    Cached { age: Duration, fresh_for: Duration },
}

/// Result of a weather lookup
#[derive(Debug, Clone)]
pub struct Lookup {
    pub place: Place,
    pub text: String,
    pub source: Source,
}

impl Lookup {
    pub fn is_cached(&self) -> bool {
        matches!(self.source, Source::Cached { .. })
    }

    /// Report text plus the cache note, if any
    pub fn display(&self) -> String {
        match self.source {
            Source::Fresh => self.text.clone(),
            Source::Cached { age, fresh_for } => {
                format!("{}{}\n", self.text, cache_annotation(age, fresh_for))
            }
        }
    }
}

/// Weather lookups backed by a shared cache
#[derive(Debug, Clone)]
pub struct WeatherService {
    geocoder: Geocoder,
    provider: WeatherProvider,
    cache: Arc<WeatherCache>,
}

impl WeatherService {
    pub fn new(geocoder: Geocoder, provider: WeatherProvider, cache: Arc<WeatherCache>) -> Self {
        Self {
            geocoder,
            provider,
            cache,
        }
    }

    /// Build the upstream clients from config around an existing cache
    pub fn from_config(
        config: &WeatherConfig,
        cache: Arc<WeatherCache>,
    ) -> Result<Self, WeatherError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(Self::new(
            Geocoder::new(&config.geocode_url, timeout)?,
            WeatherProvider::new(&config.forecast_url, timeout)?,
            cache,
        ))
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    pub async fn geocode(&self, query: &str) -> Result<Place, WeatherError> {
        self.geocoder.geocode(query).await
    }

    /// Look up weather for a place name.
    pub async fn lookup(&self, query: &str) -> Result<Lookup, WeatherError> {
        let place = self.geocoder.geocode(query).await?;
        self.lookup_place(query, place).await
    }

    /// Look up weather for already-known coordinates, labelled `label`.
    ///
    /// Nothing is cached when the fetch or parse fails.
    pub async fn lookup_place(&self, label: &str, place: Place) -> Result<Lookup, WeatherError> {
        if let Some(hit) = self.cache.get(place.latitude, place.longitude) {
            return Ok(Lookup {
                place,
                text: hit.entry.rendered().to_string(),
                source: Source::Cached {
                    age: hit.age,
                    fresh_for: hit.fresh_for(),
                },
            });
        }

        let payload = self
            .provider
            .fetch_current(place.latitude, place.longitude)
            .await?;
        let current = CurrentConditions::from_payload(&payload)?;
        let text = render_report(label, &place, &current);

        self.cache
            .set(place.latitude, place.longitude, payload, text.clone());

        Ok(Lookup {
            place,
            text,
            source: Source::Fresh,
        })
    }
}
