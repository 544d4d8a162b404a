use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Rain,
    HeavyRain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 61 | 63 | 80 | 81 => Self::Rain,
            65 | 82 => Self::HeavyRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Emoji shown next to the description in reports
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "🌤️",
            Self::Cloudy => "☁️",
            Self::Fog => "🌫️",
            Self::Rain => "🌧️",
            Self::HeavyRain => "⛈️",
            Self::Snow => "🌨️",
            Self::Thunderstorm => "⚡",
            Self::Unknown => "🌈",
        }
    }
}

/// Detailed human-readable text for a WMO weather code.
pub fn wmo_description(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    /// Full address as reported by the geocoder
    pub display_name: String,
}

/// Current conditions read out of an Open-Meteo payload.
///
/// Fields the upstream omitted are `None` and render as `N/A`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentConditions {
    pub time: Option<String>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub weather_code: i64,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation: f64,
    pub cloud_cover: Option<f64>,
}

impl CurrentConditions {
    /// Parse the `current` block of a forecast response.
    pub fn from_payload(payload: &Value) -> Result<Self, WeatherError> {
        let current = payload
            .get("current")
            .and_then(Value::as_object)
            .ok_or_else(|| WeatherError::Parse("response has no 'current' block".into()))?;

        let num = |key: &str| current.get(key).and_then(Value::as_f64);

        Ok(Self {
            time: current
                .get("time")
                .and_then(Value::as_str)
                .map(str::to_string),
            temperature: num("temperature_2m"),
            feels_like: num("apparent_temperature"),
            humidity: num("relative_humidity_2m"),
            weather_code: current
                .get("weather_code")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            wind_speed: num("wind_speed_10m"),
            wind_direction: num("wind_direction_10m"),
            precipitation: num("precipitation").unwrap_or(0.0),
            cloud_cover: num("cloud_cover"),
        })
    }

    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }

    pub fn description(&self) -> &'static str {
        wmo_description(self.weather_code)
    }
}

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("No location given")]
    EmptyQuery,
    #[error("Could not find location: {0}")]
    LocationNotFound(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Favorites error: {0}")]
    Favorites(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
