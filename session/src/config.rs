use anyhow::{Context, Result, anyhow};
use common::Difficulty;
use std::time::Duration;
use tracing::info;
use url::Url;
use uuid::Uuid;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Settings for one game session, read from `BESTBEFORE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub api_url: Url,
    pub player_id: String,
    pub difficulty: Difficulty,
    /// Spawner seed. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn new(api_url: Url, player_id: impl Into<String>) -> Self {
        SessionConfig {
            api_url,
            player_id: player_id.into(),
            difficulty: Difficulty::default(),
            seed: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("BESTBEFORE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_base_url(&api_url)?;

        let player_id = lookup("BESTBEFORE_PLAYER_ID")
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| {
                let generated = format!("player-{}", &Uuid::new_v4().simple().to_string()[..8]);
                info!("BESTBEFORE_PLAYER_ID not set, playing as {}", generated);
                generated
            });

        let difficulty = match lookup("BESTBEFORE_DIFFICULTY") {
            Some(raw) => raw.parse().context("BESTBEFORE_DIFFICULTY is invalid")?,
            None => Difficulty::default(),
        };

        let seed = lookup("BESTBEFORE_SEED")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .context("BESTBEFORE_SEED must be an unsigned integer")?;

        let timeout_ms = lookup("BESTBEFORE_REQUEST_TIMEOUT_MS")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .context("BESTBEFORE_REQUEST_TIMEOUT_MS must be a number of milliseconds")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Ok(SessionConfig {
            api_url,
            player_id,
            difficulty,
            seed,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Parse a backend base URL, defaulting the scheme to http and making sure the
/// path ends in `/` so relative endpoints join beneath it.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw)
        .ok()
        .filter(|url| url.has_host())
        .map(Ok)
        .unwrap_or_else(|| Url::parse(&format!("http://{raw}")))
        .context("Invalid base URL")?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("Unsupported scheme '{}' in base URL", url.scheme()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Ok(url)
}
