use crate::types::WeatherError;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,rain,showers,snowfall,weather_code,cloud_cover,\
wind_speed_10m,wind_direction_10m,wind_gusts_10m";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,precipitation,weather_code";

/// Open-Meteo forecast client
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    forecast_url: String,
}

impl WeatherProvider {
    pub fn new(forecast_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            forecast_url: forecast_url.into(),
        })
    }

    /// Fetch current conditions plus today's hourly series.
    ///
    /// The payload is returned as-is; callers parse what they display.
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<Value, WeatherError> {
        tracing::info!("Fetching weather for {:.4}, {:.4}", lat, lon);

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Weather request failed: {}", e);
                WeatherError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned status {}", status);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().await?;
        if !payload.is_object() {
            return Err(WeatherError::Parse("forecast response is not an object".into()));
        }

        tracing::debug!("Weather data fetched successfully");
        Ok(payload)
    }
}
