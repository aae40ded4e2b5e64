#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use super::settings::parse_max_chars;
use super::settings::DEFAULT_MAX_CHARS_TO_SPLIT;
use crate::domain::models::SinkName;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);
// Values given through CLI arguments or environment variables.
static OVERRIDES: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AutoSend,
    ConfigFile,
    Lang,
    ListenAddr,
    MaxCharsToSplit,
    Prompt,
    SettleDelay,
    Sink,
    TmuxTarget,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    /// The CLI or environment value for `key`, if one was given. These sit
    /// above the config file, including when it is reloaded.
    pub fn get_override(key: ConfigKey) -> Option<String> {
        return OVERRIDES.get(&key.to_string()).map(|val| return val.to_string());
    }

    fn set_override(key: ConfigKey, value: &str) {
        Config::set(key, value);
        OVERRIDES.insert(key.to_string(), value.to_string());
    }

    pub fn get_bool(key: ConfigKey) -> bool {
        return Config::get(key) == "true";
    }

    pub fn default(key: ConfigKey) -> String {
        let default_sink = SinkName::Auto.to_string();
        let default_max_chars = DEFAULT_MAX_CHARS_TO_SPLIT.to_string();

        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("morsel/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = path::PathBuf::from(env::var("HOME").unwrap_or_default())
            .join(".config/morsel/config.toml");

        let res = match key {
            ConfigKey::AutoSend => "false",
            ConfigKey::Lang => "",
            ConfigKey::ListenAddr => "127.0.0.1:7878",
            ConfigKey::MaxCharsToSplit => &default_max_chars,
            ConfigKey::Prompt => "",
            ConfigKey::SettleDelay => "1000",
            ConfigKey::Sink => &default_sink,
            ConfigKey::TmuxTarget => "",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    pub fn config_file_path() -> path::PathBuf {
        return path::PathBuf::from(Config::get(ConfigKey::ConfigFile));
    }

    fn validate() -> Result<()> {
        let max_chars = Config::get(ConfigKey::MaxCharsToSplit);
        if parse_max_chars(&max_chars).is_none() {
            bail!(format!(
                "Invalid value for '{}': {max_chars}\nExpected a positive integer.",
                ConfigKey::MaxCharsToSplit
            ));
        }

        let settle_delay = Config::get(ConfigKey::SettleDelay);
        if settle_delay.trim().parse::<u64>().is_err() {
            bail!(format!(
                "Invalid value for '{}': {settle_delay}\nExpected a number of milliseconds.",
                ConfigKey::SettleDelay
            ));
        }

        return Ok(());
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        OVERRIDES.clear();
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }
        Config::set(ConfigKey::ConfigFile, &config_file);

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        if !arg.get_possible_values().is_empty() {
                            possible_values = arg
                                .get_possible_values()
                                .iter()
                                .map(|e| return e.get_name().to_string())
                                .collect::<Vec<String>>();
                        }
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_bool) = val.as_bool() {
                        Config::set(key, &val_bool.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if key == ConfigKey::AutoSend {
                    if let Ok(Some(true)) = matches.try_get_one::<bool>(&key.to_string()) {
                        Config::set_override(key, "true");
                    }
                    continue;
                }

                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set_override(key, val)
                }
            }
        }

        Config::validate()?;

        tracing::debug!(
            sink = Config::get(ConfigKey::Sink),
            lang = Config::get(ConfigKey::Lang),
            max_chars_to_split = Config::get(ConfigKey::MaxCharsToSplit),
            auto_send = Config::get(ConfigKey::AutoSend),
            settle_delay = Config::get(ConfigKey::SettleDelay),
            config_file = Config::get(ConfigKey::ConfigFile),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::Prompt {
                    return Some(
                        "# Prompt template used when a message doesn't carry one. Supports {{TITLE}}, {{CONTENT}}, {{URL}} and {{SELECTED_LANGUAGE}}.\n# prompt = \"\"\"\n# {{CONTENT}}\n# \"\"\""
                            .to_string(),
                    );
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg.get_help()?.to_string();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() || val == "true" || val == "false" {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
