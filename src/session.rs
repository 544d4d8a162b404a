//! Interactive prompt. One cache lives for the whole session, so repeated
//! lookups of the same place are served locally until they go stale.

use std::io::Write;

use skycast_core::{AppError, Config};
use skycast_weather::{FavoritesStore, WeatherService};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands;

const HELP: &str = "\
Type a city (\"Groningen, Netherlands\") to see its weather.

  :stats             cached locations
  :clear             drop the cache
  :fav               list favorites
  :fav add <city>    save a city
  :fav rm <name>     remove a favorite
  :fav show <name>   weather for a favorite
  :help              this text
  :quit              exit";

/// One line of input
#[derive(Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Lookup(String),
    Stats,
    Clear,
    ListFavorites,
    AddFavorite(String),
    RemoveFavorite(String),
    ShowFavorite(String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl SessionCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Self::Lookup(line.to_string());
        };

        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (rest, ""),
        };

        match cmd {
            "stats" => Self::Stats,
            "clear" => Self::Clear,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "fav" => Self::parse_fav(arg),
            _ => Self::Unknown(line.to_string()),
        }
    }

    fn parse_fav(arg: &str) -> Self {
        let (sub, name) = match arg.split_once(char::is_whitespace) {
            Some((sub, name)) => (sub, name.trim().to_string()),
            None => (arg, String::new()),
        };

        match (sub, name.is_empty()) {
            ("", _) | ("list", _) => Self::ListFavorites,
            ("add", false) => Self::AddFavorite(name),
            ("rm" | "remove", false) => Self::RemoveFavorite(name),
            ("show", false) => Self::ShowFavorite(name),
            _ => Self::Unknown(format!(":fav {}", arg)),
        }
    }
}

fn prompt(service: &WeatherService) {
    print!("[{} cached] > ", service.cache().stats().entry_count);
    // A failed flush only delays the prompt
    let _ = std::io::stdout().flush();
}

/// Run the prompt loop until `:quit` or end of input.
pub async fn run(
    config: &Config,
    service: WeatherService,
    mut favorites: FavoritesStore,
) -> Result<(), AppError> {
    println!("🌤️  SkyCast v{}\n", commands::APP_VERSION);
    println!("{}\n", HELP);

    let update_task = config
        .update
        .check_on_startup
        .then(|| tokio::spawn(background_update_check(config.clone())));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(&service);
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let result = match SessionCommand::parse(&line) {
            SessionCommand::Empty => Ok(()),
            SessionCommand::Quit => break,
            SessionCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
            SessionCommand::Lookup(city) => commands::show_weather(&service, &city).await,
            SessionCommand::Stats => {
                commands::print_cache_stats(service.cache());
                Ok(())
            }
            SessionCommand::Clear => {
                commands::clear_cache(service.cache());
                Ok(())
            }
            SessionCommand::ListFavorites => {
                commands::list_favorites(&favorites);
                Ok(())
            }
            SessionCommand::AddFavorite(city) => {
                commands::add_favorite(&service, &mut favorites, &city).await
            }
            SessionCommand::RemoveFavorite(name) => {
                commands::remove_favorite(&mut favorites, &name)
            }
            SessionCommand::ShowFavorite(name) => {
                commands::show_favorite(&service, &favorites, &name).await
            }
            SessionCommand::Unknown(input) => {
                println!("Unknown command: {} (try :help)", input);
                Ok(())
            }
        };

        if let Err(e) = result {
            commands::report_error(&e);
        }
    }

    if let Some(task) = update_task {
        task.abort();
    }
    tracing::info!("Session closed");
    Ok(())
}

async fn background_update_check(config: Config) {
    let checker = match commands::update_checker(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Update check unavailable: {}", e);
            return;
        }
    };

    match checker.check().await {
        Ok(Some(info)) => {
            eprintln!(
                "\n⬇️ Update available: v{} (run `skycast update check` for details)",
                info.version
            );
        }
        Ok(None) => tracing::debug!("No update available"),
        Err(e) => tracing::warn!("Error checking updates on startup: {}", e),
    }
}
