mod cli;
mod commands;
mod session;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use skycast_core::{AppError, Config};
use skycast_weather::{FavoritesStore, WeatherCache, WeatherService};

use cli::{join_words, Cli, Command, ConfigCommand, FavoritesCommand, UpdateCommand};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let (loaded, created) = load_config(&config_path);

    // Logging waits for the config so `logging.debug` applies from the start
    let debug = cli.debug || loaded.as_ref().is_ok_and(|c| c.logging.debug);
    skycast_core::init(debug)?;
    if created && loaded.is_ok() {
        tracing::info!("Created default config at {}", config_path.display());
    }

    tracing::debug!("SkyCast v{} started", commands::APP_VERSION);

    match run(cli, &config_path, loaded).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            commands::report_error(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Load the config, writing defaults on first run. The flag reports whether
/// the file was created, so it can be logged once logging is up.
fn load_config(path: &Path) -> (Result<Config>, bool) {
    let created = !path.exists();
    (Config::load_from(path), created)
}

async fn run(cli: Cli, config_path: &Path, loaded: Result<Config>) -> Result<(), AppError> {
    let config = loaded?;
    let command = cli.command.unwrap_or(Command::Interactive);

    // Commands that never touch the weather service
    match &command {
        Command::Update { action } => {
            config.ensure_valid()?;
            return match action {
                UpdateCommand::Check => commands::check_update(&config).await,
                UpdateCommand::Download { output, asset } => {
                    commands::download_update(&config, asset, output).await
                }
            };
        }
        // `config validate` reports problems itself instead of bailing
        Command::Config { action } => {
            match action {
                ConfigCommand::Show => println!("{}", config.to_toml_string()?),
                ConfigCommand::Validate => commands::validate_config(&config),
                ConfigCommand::Path => println!("{}", config_path.display()),
            }
            return Ok(());
        }
        _ => {
            config.ensure_valid()?;
        }
    }

    // One cache per process, handed to the service that fills it
    let cache = Arc::new(WeatherCache::from_minutes(config.weather.cache_ttl_minutes));
    let service = WeatherService::from_config(&config.weather, cache)?;
    let mut favorites = FavoritesStore::open(config.favorites_path())?;

    match command {
        Command::Weather { city } => {
            let query = match join_words(&city) {
                q if q.is_empty() => config.weather.default_city.clone(),
                q => q,
            };
            commands::show_weather(&service, &query).await
        }
        Command::Interactive => session::run(&config, service, favorites).await,
        Command::Favorites { action } => match action {
            FavoritesCommand::List => {
                commands::list_favorites(&favorites);
                Ok(())
            }
            FavoritesCommand::Add { city } => {
                commands::add_favorite(&service, &mut favorites, &join_words(&city)).await
            }
            FavoritesCommand::Remove { name } => {
                commands::remove_favorite(&mut favorites, &join_words(&name))
            }
        },
        Command::Update { .. } | Command::Config { .. } => Ok(()),
    }
}
