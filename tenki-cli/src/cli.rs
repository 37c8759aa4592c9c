use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tenki_core::{
    CanonicalWeather, Config, Coordinates, FixedLocation, LocationQuery, ProviderId,
    WeatherResolver,
};

use crate::{history::SearchHistory, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tenki", version, about = "Current weather for places and coordinates")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weatherapi".
        provider: String,
    },

    /// Show weather for a place name or postal code.
    Show {
        /// Place name ("東京", "London") or Japanese postal code ("100-0001").
        query: String,

        /// Print the canonical record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show weather for a latitude/longitude pair.
    Coords {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,

        #[arg(long)]
        json: bool,
    },

    /// Show weather at the configured home position.
    Here {
        #[arg(long)]
        json: bool,
    },

    /// List recent searches, newest first.
    History {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { query, json } => {
                let weather = lookup(query.as_str().into()).await?;
                record_search(&query, &weather);
                print(&weather, json)
            }
            Command::Coords {
                latitude,
                longitude,
                json,
            } => {
                let coordinates = Coordinates::new(latitude, longitude)?;
                let weather = lookup(coordinates.into()).await?;
                print(&weather, json)
            }
            Command::Here { json } => {
                let config = Config::load()?;
                let resolver = WeatherResolver::from_config_default(&config)?;
                let home = config.home.ok_or_else(|| {
                    anyhow!(
                        "No home position configured.\n\
                         Hint: add `home = {{ latitude = .., longitude = .. }}` to {}.",
                        Config::config_file_path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|_| "the config file".to_string())
                    )
                })?;
                let weather = resolver.resolve_current(&FixedLocation::at(home)).await?;
                print(&weather, json)
            }
            Command::History { limit } => {
                let history = SearchHistory::load()?;
                if history.is_empty() {
                    println!("No searches yet.");
                } else {
                    print!("{}", render::history(history.latest(limit)));
                }
                Ok(())
            }
        }
    }
}

async fn lookup(query: LocationQuery) -> anyhow::Result<CanonicalWeather> {
    let config = Config::load()?;
    let resolver = WeatherResolver::from_config_default(&config)?;
    Ok(resolver.resolve_query(query).await?)
}

fn print(weather: &CanonicalWeather, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(weather)?);
    } else {
        print!("{}", render::weather(weather));
    }
    Ok(())
}

/// History is best effort; a failed write never fails the lookup.
fn record_search(query: &str, weather: &CanonicalWeather) {
    let result = SearchHistory::load().and_then(|mut history| {
        history.record(query, weather);
        history.save()
    });
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to update search history");
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let api_key = inquire::Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        config.upsert_provider_api_key(id, api_key.trim().to_string());
    }

    let base_url = inquire::Text::new(&format!("Base URL for {id}:"))
        .with_default(config.base_url(id))
        .prompt()
        .context("Failed to read base URL")?;
    if base_url != id.default_base_url() {
        config.providers.entry(id.as_str().to_string()).or_default().base_url = Some(base_url);
    }

    if id == ProviderId::Kujira {
        config.regional_enabled =
            inquire::Confirm::new("Use the regional provider for Japanese places?")
                .with_default(config.regional_enabled)
                .prompt()
                .context("Failed to read answer")?;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
