use std::env;
use std::time::Duration;

use clap::{Parser, Subcommand};
use session::config::SessionConfig;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the species observation dashboard")]
pub struct Cli {
    /// Base URL of the biodiversity service (env: SPECIES_API_BASE)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Country filter for timelines, ISO 3166-1 alpha-2 (env: SPECIES_COUNTRY)
    #[arg(long)]
    pub country: Option<String>,

    /// Search debounce in milliseconds (env: SPECIES_DEBOUNCE_MS)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Delay before hiding results after blur, at least 150 (env: SPECIES_BLUR_GRACE_MS)
    #[arg(long)]
    pub blur_grace_ms: Option<u64>,

    /// Maximum number of popular species shown (env: SPECIES_POPULAR_LIMIT)
    #[arg(long)]
    pub popular_limit: Option<usize>,

    /// HTTP request timeout in seconds (env: SPECIES_HTTP_TIMEOUT_S)
    #[arg(long)]
    pub timeout_s: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Type a query into the search box and print the result panel
    Search { text: String },

    /// Search, pick a result and print its timeline and map
    Show {
        text: String,

        /// Which search result to pick
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Print the popular species list, optionally selecting one
    Popular {
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Read actions from stdin: text, :pick N, :popular N, :clear, :focus, :blur, :quit
    Interactive,
}

/// Resolved runtime settings: environment first, then command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let session = defaults.session.clone();
        Self {
            api_base: env_var_string("SPECIES_API_BASE", &defaults.api_base),
            timeout: Duration::from_secs(env_var_u64(
                "SPECIES_HTTP_TIMEOUT_S",
                defaults.timeout.as_secs(),
            )),
            session: session
                .clone()
                .with_country(env_var_string("SPECIES_COUNTRY", &session.country))
                .with_debounce(Duration::from_millis(env_var_u64(
                    "SPECIES_DEBOUNCE_MS",
                    millis(session.debounce),
                )))
                .with_blur_grace(Duration::from_millis(env_var_u64(
                    "SPECIES_BLUR_GRACE_MS",
                    millis(session.blur_grace),
                )))
                .with_popular_limit(env_var_usize("SPECIES_POPULAR_LIMIT", session.popular_limit)),
        }
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(api_base) = &cli.api_base {
            self.api_base = api_base.clone();
        }
        if let Some(secs) = cli.timeout_s {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(country) = &cli.country {
            self.session = self.session.with_country(country.clone());
        }
        if let Some(ms) = cli.debounce_ms {
            self.session = self.session.with_debounce(Duration::from_millis(ms));
        }
        if let Some(ms) = cli.blur_grace_ms {
            self.session = self.session.with_blur_grace(Duration::from_millis(ms));
        }
        if let Some(limit) = cli.popular_limit {
            self.session = self.session.with_popular_limit(limit);
        }
        self
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn env_var_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
