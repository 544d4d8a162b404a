//! Forward geocoding: turn a place name into coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use crate::types::{Place, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Nominatim search client
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve `query` (e.g. "Groningen, Netherlands") to the best match.
    pub async fn geocode(&self, query: &str) -> Result<Place, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        tracing::info!("Geocoding location: {}", query);

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Geocode request failed: {}", e);
                WeatherError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Geocoder returned status {}", status);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let results: Vec<NominatimPlace> = response.json().await?;
        let best = results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(query.to_string()))?;

        let place = Place {
            latitude: parse_coordinate(&best.lat, "lat")?,
            longitude: parse_coordinate(&best.lon, "lon")?,
            display_name: best.display_name.unwrap_or_else(|| query.to_string()),
        };

        tracing::info!("Found coordinates: {}, {}", place.latitude, place.longitude);
        Ok(place)
    }
}

fn parse_coordinate(value: &str, field: &str) -> Result<f64, WeatherError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| WeatherError::Parse(format!("invalid {} '{}' from geocoder", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("53.2190652", "lat").unwrap(), 53.2190652);
        assert_eq!(parse_coordinate(" -6.5 ", "lon").unwrap(), -6.5);
        assert!(matches!(
            parse_coordinate("north", "lat"),
            Err(WeatherError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_without_request() {
        // Unroutable base URL: a request would fail with a network error
        let geocoder = Geocoder::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = geocoder.geocode("   ").await.unwrap_err();
        assert!(matches!(err, WeatherError::EmptyQuery));
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -p skycast-weather -- --ignored
    async fn test_geocode_groningen_live() {
        let geocoder = Geocoder::new(NOMINATIM_URL, Duration::from_secs(10)).unwrap();
        let place = geocoder.geocode("Groningen, Netherlands").await.unwrap();
        assert!((place.latitude - 53.2).abs() < 0.2);
        assert!((place.longitude - 6.56).abs() < 0.2);
    }
}
