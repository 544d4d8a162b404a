//! Weather lookups for SkyCast
//!
//! Geocoding via Nominatim, current conditions via the Open-Meteo API,
//! an in-memory TTL cache keyed by rounded coordinates, and a JSON
//! favorites list.

pub mod cache;
mod error_mapping;
pub mod favorites;
pub mod format;
pub mod geocode;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{CacheEntry, CacheHit, CacheKey, CacheStats, Clock, SystemClock, WeatherCache};
pub use favorites::{Favorite, FavoritesStore};
pub use geocode::Geocoder;
pub use provider::WeatherProvider;
pub use service::{Lookup, Source, WeatherService};
pub use types::*;
