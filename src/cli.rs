use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "skycast", version, about = "Current weather for any city, from the terminal")]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the weather for a city (defaults to the configured city)
    Weather {
        /// City, optionally with country: "Groningen, Netherlands"
        city: Vec<String>,
    },
    /// Interactive session with a shared cache (the default)
    Interactive,
    /// Manage saved locations
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
    /// Check GitHub for a newer release
    Update {
        #[command(subcommand)]
        action: UpdateCommand,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// List saved locations
    List,
    /// Geocode a city and save it
    Add { city: Vec<String> },
    /// Remove a saved location by name
    Remove { name: Vec<String> },
}

#[derive(Subcommand, Debug)]
pub enum UpdateCommand {
    /// Report whether a newer release exists
    Check,
    /// Download a release asset of the newest release
    Download {
        /// Where to write the file
        #[arg(long, short)]
        output: PathBuf,
        /// Asset file name in the release
        #[arg(long, default_value = "Weather.exe")]
        asset: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Validate the configuration and list warnings
    Validate,
    /// Print the config file path
    Path,
}

/// Join free-form words into one query ("new" "york" -> "new york")
pub fn join_words(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weather_with_spaces() {
        let cli = Cli::parse_from(["skycast", "weather", "Groningen,", "Netherlands"]);
        match cli.command {
            Some(Command::Weather { city }) => {
                assert_eq!(join_words(&city), "Groningen, Netherlands")
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["skycast", "--debug"]);
        assert!(cli.debug);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_update_download_defaults_asset() {
        let cli = Cli::parse_from(["skycast", "update", "download", "-o", "/tmp/w.exe"]);
        match cli.command {
            Some(Command::Update {
                action: UpdateCommand::Download { output, asset },
            }) => {
                assert_eq!(output, PathBuf::from("/tmp/w.exe"));
                assert_eq!(asset, "Weather.exe");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["skycast", "favorites", "list", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
