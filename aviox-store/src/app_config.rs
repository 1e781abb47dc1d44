use aviox_offer::{DisplayConfig, LookupDefaults, SortKey, StopFilter};
use chrono::NaiveDate;
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub amadeus: AmadeusConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_llm_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_llm_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_timeout() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusConfig {
    #[serde(default = "default_amadeus_url")]
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_amadeus_url() -> String { "https://test.api.amadeus.com".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_passengers")]
    pub passenger_count: u32,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Fixed "today" for sandboxed providers that only accept a date window.
    pub reference_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub stops: StopFilter,
}

fn default_passengers() -> u32 { 1 }
fn default_max_results() -> u32 { 15 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            passenger_count: default_passengers(),
            max_results: default_max_results(),
            reference_date: None,
            sort_by: SortKey::default(),
            stops: StopFilter::default(),
        }
    }
}

impl SearchConfig {
    pub fn lookup_defaults(&self) -> LookupDefaults {
        LookupDefaults {
            passenger_count: self.passenger_count,
            max_results: self.max_results,
        }
    }

    pub fn display(&self) -> DisplayConfig {
        DisplayConfig { sort_by: self.sort_by, stops: self.stops }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            // Per-environment and local overrides are optional
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            .add_source(config::File::with_name(&file("local")).required(false))
            // Eg. `AVIOX__LLM__API_KEY=...` sets `llm.api_key`
            .add_source(config::Environment::with_prefix("AVIOX").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
