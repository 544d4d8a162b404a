//! Command handlers shared by one-shot subcommands and the interactive session.

use std::path::Path;

use skycast_core::{AppError, Config, WeatherError as CoreWeatherError};
use skycast_update::{UpdateChecker, UpdateError};
use skycast_weather::{Favorite, FavoritesStore, WeatherCache, WeatherService};

/// Version compared against GitHub releases
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn update_checker(config: &Config) -> Result<UpdateChecker, UpdateError> {
    UpdateChecker::new(&config.update.api_url, &config.update.github_repo, APP_VERSION)
}

/// Look up and print the weather for `query`.
pub async fn show_weather(service: &WeatherService, query: &str) -> Result<(), AppError> {
    println!("⏳ Looking up: {}", query);
    let lookup = service.lookup(query).await?;
    println!(
        "✓ Coordinates found: {:.4}, {:.4}\n",
        lookup.place.latitude, lookup.place.longitude
    );
    print!("{}", lookup.display());
    Ok(())
}

/// Print the weather for a saved location without geocoding it again.
pub async fn show_favorite(
    service: &WeatherService,
    favorites: &FavoritesStore,
    name: &str,
) -> Result<(), AppError> {
    let favorite = favorites
        .get(name)
        .ok_or_else(|| CoreWeatherError::LocationNotFound(format!("favorite '{}'", name)))?;

    let lookup = service
        .lookup_place(&favorite.name, favorite.place())
        .await?;
    print!("{}", lookup.display());
    Ok(())
}

pub fn list_favorites(favorites: &FavoritesStore) {
    if favorites.list().is_empty() {
        println!("No favorites saved yet.");
        return;
    }
    for f in favorites.list() {
        println!(
            "★ {:<20} {:>9.4}, {:>9.4}  {}",
            f.name, f.latitude, f.longitude, f.display_name
        );
    }
}

/// Geocode `city` and save it.
pub async fn add_favorite(
    service: &WeatherService,
    favorites: &mut FavoritesStore,
    city: &str,
) -> Result<(), AppError> {
    let place = service.geocode(city).await?;
    if favorites.add(Favorite::from_place(city, &place)) {
        favorites.save()?;
        println!("★ Saved {} ({})", city, place.display_name);
    } else {
        println!("{} is already a favorite.", city);
    }
    Ok(())
}

pub fn remove_favorite(favorites: &mut FavoritesStore, name: &str) -> Result<(), AppError> {
    if favorites.remove(name) {
        favorites.save()?;
        println!("Removed {}.", name);
    } else {
        println!("No favorite named {}.", name);
    }
    Ok(())
}

pub fn print_cache_stats(cache: &WeatherCache) {
    let stats = cache.stats();
    println!(
        "{} cached (TTL {} min)",
        stats.entry_count,
        cache.ttl().as_secs() / 60
    );
    for key in &stats.keys {
        println!("  • {}", key);
    }
}

pub fn clear_cache(cache: &WeatherCache) {
    let removed = cache.clear();
    println!("Cleared {} cache entries.", removed);
}

pub async fn check_update(config: &Config) -> Result<(), AppError> {
    let checker = update_checker(config)?;
    match checker.check().await? {
        Some(info) => {
            println!("A new version is available!\n");
            println!("Current version: v{}", checker.current_version());
            println!("Latest version:  v{}\n", info.version);
            println!("Release notes:\n{}\n", info.notes_preview());
            if let Some(url) = &info.url {
                println!("Download: {}", url);
            }
        }
        None => println!("You are running the latest version (v{}).", APP_VERSION),
    }
    Ok(())
}

pub async fn download_update(config: &Config, asset_name: &str, output: &Path) -> Result<(), AppError> {
    let checker = update_checker(config)?;
    let info = match checker.check().await? {
        Some(info) => info,
        None => {
            println!("You are running the latest version (v{}).", APP_VERSION);
            return Ok(());
        }
    };

    let asset = info
        .find_asset(asset_name)
        .ok_or_else(|| UpdateError::AssetNotFound(asset_name.to_string()))?;
    let bytes = checker.download_asset(asset, output).await?;
    println!(
        "⬇️ Downloaded v{} ({} bytes) to {}",
        info.version,
        bytes,
        output.display()
    );
    Ok(())
}

pub fn validate_config(config: &Config) {
    let result = config.validate();
    for e in &result.errors {
        println!("error:   {}", e);
    }
    for w in &result.warnings {
        println!("warning: {}", w);
    }
    if result.is_valid() {
        println!("Configuration is valid.");
    }
}

/// Print an error the way the user should see it; details go to the log.
pub fn report_error(err: &AppError) {
    tracing::error!("{}", err);
    eprintln!("❌ ERROR\n\n{}\n", err.user_message());
    if matches!(
        err,
        AppError::Weather(CoreWeatherError::LocationNotFound(_)) | AppError::Network(_)
    ) {
        eprintln!("Please check:");
        eprintln!("  • City name spelling");
        eprintln!("  • Internet connection");
        eprintln!("  • Try format: 'City, Country'");
    }
}
