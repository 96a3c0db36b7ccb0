use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub assistant: AssistantConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Keys under which the assistant keeps its blobs in the key-value store.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub history_key: String,
    pub cart_key: String,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// How many names the chat "recommend" reply lists.
    pub chat_recommendation_count: usize,
    pub default_recommendation_limit: usize,
    /// Optional cap on chat input length. Unset means every non-empty
    /// message is answered.
    pub max_message_chars: Option<usize>,
    /// Scans below this confidence are not tracked as views.
    pub scan_confidence_threshold: f64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub history_key: Option<String>,
    pub cart_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_HISTORY_KEY: &str = "ai_messages";
pub const DEFAULT_CART_KEY: &str = "cart";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://shopsense.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            storage: StorageConfig {
                history_key: DEFAULT_HISTORY_KEY.to_string(),
                cart_key: DEFAULT_CART_KEY.to_string(),
            },
            assistant: AssistantConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chat_recommendation_count: 3,
            default_recommendation_limit: 5,
            max_message_chars: None,
            scan_confidence_threshold: 0.75,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shopsense.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(history_key) = storage.history_key {
                self.storage.history_key = history_key;
            }
            if let Some(cart_key) = storage.cart_key {
                self.storage.cart_key = cart_key;
            }
        }

        if let Some(assistant) = patch.assistant {
            if let Some(count) = assistant.chat_recommendation_count {
                self.assistant.chat_recommendation_count = count;
            }
            if let Some(limit) = assistant.default_recommendation_limit {
                self.assistant.default_recommendation_limit = limit;
            }
            if let Some(max_chars) = assistant.max_message_chars {
                self.assistant.max_message_chars = Some(max_chars);
            }
            if let Some(threshold) = assistant.scan_confidence_threshold {
                self.assistant.scan_confidence_threshold = threshold;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHOPSENSE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SHOPSENSE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("SHOPSENSE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SHOPSENSE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("SHOPSENSE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SHOPSENSE_STORAGE_HISTORY_KEY") {
            self.storage.history_key = value;
        }
        if let Some(value) = read_env("SHOPSENSE_STORAGE_CART_KEY") {
            self.storage.cart_key = value;
        }

        if let Some(value) = read_env("SHOPSENSE_ASSISTANT_CHAT_RECOMMENDATION_COUNT") {
            self.assistant.chat_recommendation_count =
                parse_usize("SHOPSENSE_ASSISTANT_CHAT_RECOMMENDATION_COUNT", &value)?;
        }
        if let Some(value) = read_env("SHOPSENSE_ASSISTANT_DEFAULT_RECOMMENDATION_LIMIT") {
            self.assistant.default_recommendation_limit =
                parse_usize("SHOPSENSE_ASSISTANT_DEFAULT_RECOMMENDATION_LIMIT", &value)?;
        }
        if let Some(value) = read_env("SHOPSENSE_ASSISTANT_MAX_MESSAGE_CHARS") {
            self.assistant.max_message_chars =
                Some(parse_usize("SHOPSENSE_ASSISTANT_MAX_MESSAGE_CHARS", &value)?);
        }
        if let Some(value) = read_env("SHOPSENSE_ASSISTANT_SCAN_CONFIDENCE_THRESHOLD") {
            self.assistant.scan_confidence_threshold =
                parse_f64("SHOPSENSE_ASSISTANT_SCAN_CONFIDENCE_THRESHOLD", &value)?;
        }

        let log_level =
            read_env("SHOPSENSE_LOGGING_LEVEL").or_else(|| read_env("SHOPSENSE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHOPSENSE_LOGGING_FORMAT").or_else(|| read_env("SHOPSENSE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(history_key) = overrides.history_key {
            self.storage.history_key = history_key;
        }
        if let Some(cart_key) = overrides.cart_key {
            self.storage.cart_key = cart_key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_storage(&self.storage)?;
        validate_assistant(&self.assistant)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shopsense.toml"), PathBuf::from("config/shopsense.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.history_key.trim().is_empty() {
        return Err(ConfigError::Validation("storage.history_key must not be empty".to_string()));
    }
    if storage.cart_key.trim().is_empty() {
        return Err(ConfigError::Validation("storage.cart_key must not be empty".to_string()));
    }
    if storage.history_key == storage.cart_key {
        return Err(ConfigError::Validation(
            "storage.history_key and storage.cart_key must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.chat_recommendation_count == 0 {
        return Err(ConfigError::Validation(
            "assistant.chat_recommendation_count must be greater than zero".to_string(),
        ));
    }

    if assistant.max_message_chars == Some(0) {
        return Err(ConfigError::Validation(
            "assistant.max_message_chars must be greater than zero".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&assistant.scan_confidence_threshold) {
        return Err(ConfigError::Validation(
            "assistant.scan_confidence_threshold must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    storage: Option<StoragePatch>,
    assistant: Option<AssistantPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    history_key: Option<String>,
    cart_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    chat_recommendation_count: Option<usize>,
    default_recommendation_limit: Option<usize>,
    max_message_chars: Option<usize>,
    scan_confidence_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
