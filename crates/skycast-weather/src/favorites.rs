//! Saved locations, persisted as a JSON array.

use crate::types::{Place, WeatherError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A saved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    /// Name the user typed, used as the handle for show/remove
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    pub fn from_place(name: impl Into<String>, place: &Place) -> Self {
        Self {
            name: name.into(),
            latitude: place.latitude,
            longitude: place.longitude,
            display_name: place.display_name.clone(),
            added_at: Utc::now(),
        }
    }

    pub fn place(&self) -> Place {
        Place {
            latitude: self.latitude,
            longitude: self.longitude,
            display_name: self.display_name.clone(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// Favorites list backed by a JSON file
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    items: Vec<Favorite>,
}

impl FavoritesStore {
    /// Load favorites from `path`. A missing file is an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WeatherError> {
        let path = path.into();

        let items: Vec<Favorite> = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json).map_err(|e| {
                WeatherError::Favorites(format!("{}: {}", path.display(), e))
            })?
        } else {
            Vec::new()
        };

        tracing::debug!("Loaded {} favorites from {:?}", items.len(), path);
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Favorite] {
        &self.items
    }

    /// Find a favorite by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Favorite> {
        self.items.iter().find(|f| f.matches(name))
    }

    /// Add a favorite. Returns false if one with the same name exists.
    pub fn add(&mut self, favorite: Favorite) -> bool {
        if self.get(&favorite.name).is_some() {
            return false;
        }
        tracing::info!("Added favorite: {}", favorite.name);
        self.items.push(favorite);
        true
    }

    /// Remove a favorite by name. Returns false if it wasn't there.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|f| !f.matches(name));
        let removed = self.items.len() != before;
        if removed {
            tracing::info!("Removed favorite: {}", name);
        }
        removed
    }

    /// Write the list back to disk
    pub fn save(&self) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.items)
            .map_err(|e| WeatherError::Favorites(e.to_string()))?;
        fs::write(&self.path, json)?;

        tracing::debug!("Saved {} favorites to {:?}", self.items.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: f64, lon: f64, name: &str) -> Place {
        Place {
            latitude: lat,
            longitude: lon,
            display_name: name.to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::open(dir.path().join("favorites.json")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FavoritesStore::open(dir.path().join("favorites.json")).unwrap();

        assert!(store.add(Favorite::from_place("Groningen", &place(53.2, 6.5, "Groningen, NL"))));
        assert!(!store.add(Favorite::from_place("groningen ", &place(0.0, 0.0, "elsewhere"))));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.get("GRONINGEN").unwrap().latitude, 53.2);
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FavoritesStore::open(dir.path().join("favorites.json")).unwrap();
        store.add(Favorite::from_place("Utrecht", &place(52.09, 5.12, "Utrecht, NL")));

        assert!(!store.remove("Amsterdam"));
        assert!(store.remove("utrecht"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("favorites.json");

        let mut store = FavoritesStore::open(&path).unwrap();
        store.add(Favorite::from_place("Utrecht", &place(52.09, 5.12, "Utrecht, NL")));
        store.add(Favorite::from_place("Oslo", &place(59.91, 10.75, "Oslo, Norge")));
        store.save().unwrap();

        let reopened = FavoritesStore::open(&path).unwrap();
        assert_eq!(reopened.list(), store.list());
        assert_eq!(reopened.get("oslo").unwrap().place(), place(59.91, 10.75, "Oslo, Norge"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FavoritesStore::open(&path).unwrap_err();
        assert!(matches!(err, WeatherError::Favorites(_)));
    }
}
