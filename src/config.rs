use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 30;
pub const DEFAULT_ASSETS_DIR: &str = "assets";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the assistant backend; requests go to `{api_base_url}/query`
    pub api_base_url: String,
    /// Pause between revealed words
    pub reveal_delay_ms: u64,
    /// Show replies word by word instead of all at once
    pub reveal_enabled: bool,
    /// Where the optional logo lives; created on startup if missing
    pub assets_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            reveal_enabled: true,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }

    /// Defaults, then the config file, then the environment. Variables in
    /// `./.env` count as environment, but real environment variables win.
    pub fn load() -> Result<Self> {
        let mut config = match Self::get_config_path() {
            Ok(path) => Self::load_from(&path)?,
            Err(e) => {
                debug!("no config directory, using defaults: {}", e);
                Self::new()
            }
        };
        let dotenv = load_dotenv(Path::new(".env"))?;
        config.apply_env(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `API_BASE_URL`, `PAI_REVEAL_DELAY_MS` and `PAI_ASSETS_DIR`.
    /// Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("API_BASE_URL") {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(delay) = lookup("PAI_REVEAL_DELAY_MS") {
            self.reveal_delay_ms = delay
                .trim()
                .parse()
                .map_err(|_| anyhow!("PAI_REVEAL_DELAY_MS must be a number of milliseconds, got {:?}", delay))?;
        }
        if let Some(dir) = lookup("PAI_ASSETS_DIR") {
            self.assets_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms.max(1))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("pai-chat").join("config.json"))
    }
}

/// Read a `.env` file without touching the process environment. A missing
/// file is empty.
pub fn load_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let vars = dotenvy::from_path_iter(path)
        .and_then(|iter| iter.collect::<Result<HashMap<_, _>, _>>())
        .with_context(|| format!("invalid env file {}", path.display()))?;
    info!("loaded {} variables from {}", vars.len(), path.display());
    Ok(vars)
}
