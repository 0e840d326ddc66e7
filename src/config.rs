use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub collections: CollectionSettings,
    pub gemini: GeminiSettings,
    pub nearby: NearbySettings,
    pub chat: ChatSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Development enables the `/dev` routes and error details in responses
    pub environment: RuntimeEnvironment,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: None,
            environment: RuntimeEnvironment::Development,
        }
    }
}

impl ServerSettings {
    pub fn is_development(&self) -> bool {
        self.environment == RuntimeEnvironment::Development
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store seeded with sample data
    #[default]
    Memory,
    Firestore,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub endpoint: String,
    pub project_id: Option<String>,
    pub database_id: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            endpoint: "https://firestore.googleapis.com/v1".to_string(),
            project_id: None,
            database_id: "(default)".to_string(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub donations: String,
    pub requests: String,
    pub ngos: String,
    pub volunteers: String,
    pub matches: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            donations: "donations".to_string(),
            requests: "requests".to_string(),
            ngos: "ngos".to_string(),
            volunteers: "volunteers".to_string(),
            matches: "matches".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub match_model: String,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            chat_model: "gemini-1.5-pro".to_string(),
            match_model: "gemini-1.5-pro".to_string(),
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NearbySettings {
    pub default_radius_km: f64,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            default_radius_km: crate::core::DEFAULT_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub session_ttl_secs: u64,
    pub max_sessions: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            session_ttl_secs: 24 * 60 * 60,
            max_sessions: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ZERO_HUNGER__)
    /// 5. Well-known variables such as GEMINI_API_KEY and PORT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ZERO_HUNGER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ZERO_HUNGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ZERO_HUNGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }
}

/// Apply the conventional variable names used by hosting platforms and the
/// Google SDKs on top of the layered configuration
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    apply_overrides(settings, |var| std::env::var(var).ok())
}

fn apply_overrides<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides = [
        ("GEMINI_API_KEY", "gemini.api_key"),
        ("FIRESTORE_ACCESS_TOKEN", "store.access_token"),
        ("GOOGLE_CLOUD_PROJECT", "store.project_id"),
        ("PORT", "server.port"),
        ("LOG_LEVEL", "logging.level"),
        ("LOG_FORMAT", "logging.format"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
