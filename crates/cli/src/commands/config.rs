use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shopsense_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &str); 11] = [
        ("database.url", config.database.url.clone(), "SHOPSENSE_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "SHOPSENSE_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "SHOPSENSE_DATABASE_TIMEOUT_SECS",
        ),
        ("storage.history_key", config.storage.history_key.clone(), "SHOPSENSE_STORAGE_HISTORY_KEY"),
        ("storage.cart_key", config.storage.cart_key.clone(), "SHOPSENSE_STORAGE_CART_KEY"),
        (
            "assistant.chat_recommendation_count",
            config.assistant.chat_recommendation_count.to_string(),
            "SHOPSENSE_ASSISTANT_CHAT_RECOMMENDATION_COUNT",
        ),
        (
            "assistant.default_recommendation_limit",
            config.assistant.default_recommendation_limit.to_string(),
            "SHOPSENSE_ASSISTANT_DEFAULT_RECOMMENDATION_LIMIT",
        ),
        (
            "assistant.max_message_chars",
            config
                .assistant
                .max_message_chars
                .map_or_else(|| "unlimited".to_string(), |max| max.to_string()),
            "SHOPSENSE_ASSISTANT_MAX_MESSAGE_CHARS",
        ),
        (
            "assistant.scan_confidence_threshold",
            config.assistant.scan_confidence_threshold.to_string(),
            "SHOPSENSE_ASSISTANT_SCAN_CONFIDENCE_THRESHOLD",
        ),
        ("logging.level", config.logging.level.clone(), "SHOPSENSE_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "SHOPSENSE_LOGGING_FORMAT"),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_key) in &fields {
        let source = field_source(
            key_path,
            Some(*env_key),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("shopsense.toml"), PathBuf::from("config/shopsense.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
