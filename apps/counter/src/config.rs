use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context};
use relay_client::RelaySettings;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "EZNOPRIMES_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug_log: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_input_file: Option<String>,

    #[serde(default)]
    pub irc_address: String,
    #[serde(default)]
    pub irc_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irc_password: Option<String>,
    #[serde(default)]
    pub irc_channel: String,

    /// Holds the non-prime subcount between runs. Read at startup when it
    /// exists, rewritten on every change. `!nonprimesubcount 0` in chat
    /// resets it.
    #[serde(default)]
    pub output_file: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Settings {
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            address: self.irc_address.clone(),
            user: self.irc_user.clone(),
            password: self.irc_password.clone(),
            channel: self.irc_channel.trim_start_matches('#').to_string(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [
            ("irc_address", &self.irc_address),
            ("irc_user", &self.irc_user),
            ("irc_channel", &self.irc_channel),
            ("output_file", &self.output_file),
        ] {
            ensure!(!value.trim().is_empty(), "config is missing required key '{key}'");
        }
        Ok(())
    }

    /// Blank config printed when none could be read, for the operator to
    /// fill in.
    pub fn sample_json() -> String {
        serde_json::to_string_pretty(&Self::default()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// `--config` wins, then the environment, then `config.json` in the working
/// directory.
pub fn resolve_config_path(cli: Option<PathBuf>, env_value: Option<String>) -> PathBuf {
    cli.or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            println!("{}", Settings::sample_json());
            return Err(error).with_context(|| {
                format!(
                    "failed to load config, please fill above sample and save to '{}'",
                    path.display()
                )
            });
        }
    };

    let mut settings = parse_settings(&raw, path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

pub fn parse_settings(raw: &str, path: &Path) -> anyhow::Result<Settings> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(raw).with_context(|| {
            format!("failed to load cfg '{}', please check syntax", path.display())
        })
    } else {
        serde_json::from_str(raw).with_context(|| {
            format!("failed to load cfg '{}', please check syntax", path.display())
        })
    }
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__IRC_ADDRESS") {
        settings.irc_address = v;
    }
    if let Some(v) = lookup("APP__IRC_USER") {
        settings.irc_user = v;
    }
    if let Some(v) = lookup("APP__IRC_PASSWORD") {
        settings.irc_password = Some(v);
    }
    if let Some(v) = lookup("APP__IRC_CHANNEL") {
        settings.irc_channel = v;
    }
    if let Some(v) = lookup("APP__OUTPUT_FILE") {
        settings.output_file = v;
    }
    if let Some(v) = lookup("APP__DEBUG_INPUT_FILE") {
        settings.debug_input_file = Some(v);
    }
    if let Some(v) = lookup("APP__DEBUG_LOG") {
        settings.debug_log = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
