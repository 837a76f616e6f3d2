use std::env;
use std::fs;
use std::path::Path;

use refin_core::config::{resolve_config_path, AppConfig, LoadOptions};
use refin_core::ApplicationError;
use serde::Serialize;
use toml::Value;

use crate::commands::{failure_from, to_data, CommandResult, EXIT_CONFIG};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return failure_from(
                "config",
                "config_validation",
                ApplicationError::Configuration(format!("config validation failed: {error}")),
                "config",
                EXIT_CONFIG,
            );
        }
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = [
        ConfigEntry {
            key: "simulation.margin_token",
            value: config.simulation.margin_token.clone(),
            source: source("simulation.margin_token", &["REFIN_SIMULATION_MARGIN_TOKEN"]),
        },
        ConfigEntry {
            key: "simulation.default_prazo",
            value: config.simulation.default_prazo.to_string(),
            source: source("simulation.default_prazo", &["REFIN_SIMULATION_DEFAULT_PRAZO"]),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["REFIN_LOGGING_LEVEL", "REFIN_LOG_LEVEL"]),
        },
        ConfigEntry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            source: source("logging.format", &["REFIN_LOGGING_FORMAT", "REFIN_LOG_FORMAT"]),
        },
    ];

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        to_data(&entries),
    )
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
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
