#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

use std::num::NonZeroUsize;
use std::path;
use std::time::Duration;

use anyhow::Result;
use notify::Event;
use notify::EventKind;
use notify::RecommendedWatcher;
use notify::RecursiveMode;
use notify::Watcher;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::time;

use super::language;
use super::Config;
use super::ConfigKey;

pub const DEFAULT_MAX_CHARS_TO_SPLIT: usize = 10000;

fn default_max_chars() -> NonZeroUsize {
    return NonZeroUsize::new(DEFAULT_MAX_CHARS_TO_SPLIT).unwrap_or(NonZeroUsize::MIN);
}

/// Parses a chunk budget, rejecting anything that isn't a positive integer.
pub fn parse_max_chars(val: &str) -> Option<NonZeroUsize> {
    return val.trim().parse::<NonZeroUsize>().ok();
}

/// The values a delivery reads from configuration, with the language already
/// resolved to a display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub lang: String,
    pub max_chars_to_split: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Settings {
        return Settings {
            lang: language::system_ui_language(),
            max_chars_to_split: default_max_chars(),
        };
    }
}

/// Settings given on the command line or through the environment. They win
/// over the config file every time it is read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub lang: Option<String>,
    pub max_chars_to_split: Option<NonZeroUsize>,
}

impl SettingsOverrides {
    pub fn from_config() -> SettingsOverrides {
        return SettingsOverrides {
            lang: Config::get_override(ConfigKey::Lang).filter(|lang| return !lang.trim().is_empty()),
            max_chars_to_split: Config::get_override(ConfigKey::MaxCharsToSplit)
                .and_then(|val| return parse_max_chars(&val)),
        };
    }
}

impl Settings {
    pub fn from_values(lang: &str, max_chars_to_split: &str) -> Settings {
        let mut max_chars = default_max_chars();
        if !max_chars_to_split.is_empty() {
            if let Some(val) = parse_max_chars(max_chars_to_split) {
                max_chars = val;
            } else {
                tracing::warn!(
                    value = max_chars_to_split,
                    "Invalid max-chars-to-split, using the default"
                );
            }
        }

        return Settings {
            lang: language::resolve(lang),
            max_chars_to_split: max_chars,
        };
    }

    pub fn from_config() -> Settings {
        return Settings::from_values(
            &Config::get(ConfigKey::Lang),
            &Config::get(ConfigKey::MaxCharsToSplit),
        );
    }

    /// Rebuilds settings from defaults, then `doc` (the config file, when
    /// present), then `overrides`. Keys missing from the file fall back to
    /// their defaults. An invalid budget in the file also falls back, with a
    /// warning.
    pub fn layered(doc: Option<&toml_edit::Document>, overrides: &SettingsOverrides) -> Settings {
        let mut lang = "".to_string();
        let mut max_chars = default_max_chars();

        if let Some(doc) = doc {
            if let Some(val) = doc
                .get(&ConfigKey::Lang.to_string())
                .and_then(|e| return e.as_str())
            {
                lang = val.to_string();
            }

            if let Some(item) = doc.get(&ConfigKey::MaxCharsToSplit.to_string()) {
                let parsed = item
                    .as_integer()
                    .and_then(|val| return usize::try_from(val).ok())
                    .and_then(NonZeroUsize::new);

                if let Some(val) = parsed {
                    max_chars = val;
                } else {
                    tracing::warn!(
                        value = item.to_string().trim(),
                        "Invalid max-chars-to-split in config file, using the default"
                    );
                }
            }
        }

        if let Some(val) = &overrides.lang {
            lang = val.to_string();
        }
        if let Some(val) = overrides.max_chars_to_split {
            max_chars = val;
        }

        return Settings {
            lang: language::resolve(&lang),
            max_chars_to_split: max_chars,
        };
    }
}

/// Gives the delivery controller the settings in effect right now.
pub trait SettingsProvider {
    fn current(&self) -> Settings;
}

pub type SettingsBox = Box<dyn SettingsProvider + Send + Sync>;

impl SettingsProvider for Settings {
    fn current(&self) -> Settings {
        return self.clone();
    }
}

/// Settings that follow a `ConfigWatcher`.
pub struct WatchedSettings {
    rx: watch::Receiver<Settings>,
}

impl SettingsProvider for WatchedSettings {
    fn current(&self) -> Settings {
        return self.rx.borrow().clone();
    }
}

/// Watches the config file and publishes rebuilt settings whenever it
/// changes.
pub struct ConfigWatcher {
    path: path::PathBuf,
    overrides: SettingsOverrides,
    debounce: Duration,
    tx: watch::Sender<Settings>,
}

impl ConfigWatcher {
    pub fn new(
        path: path::PathBuf,
        overrides: SettingsOverrides,
        initial: Settings,
    ) -> (ConfigWatcher, WatchedSettings) {
        let (tx, rx) = watch::channel(initial);
        let watcher = ConfigWatcher {
            path,
            overrides,
            debounce: Duration::from_millis(200),
            tx,
        };

        return (watcher, WatchedSettings { rx });
    }

    /// Whether `event` touches the watched config file.
    pub fn is_relevant_event(&self, event: &Event) -> bool {
        let file_name = self.path.file_name();
        return matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event
            .paths
            .iter()
            .any(|p| return p == &self.path || (file_name.is_some() && p.file_name() == file_name));
    }

    /// Re-reads the file and publishes the result. Returns true when the
    /// settings changed. A deleted file leaves defaults and overrides.
    pub async fn reload(&self) -> bool {
        let doc = match fs::read_to_string(&self.path).await {
            Ok(toml_str) => match toml_str.parse::<toml_edit::Document>() {
                Ok(doc) => Some(doc),
                Err(err) => {
                    tracing::warn!(err = ?err, path = ?self.path, "Ignoring invalid config file");
                    return false;
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(err = ?err, path = ?self.path, "Unable to read config file");
                return false;
            }
        };

        let next = Settings::layered(doc.as_ref(), &self.overrides);
        let changed = self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            return true;
        });

        if changed {
            tracing::debug!(settings = ?*self.tx.borrow(), "Settings reloaded");
        }

        return changed;
    }

    pub async fn start(self) -> Result<()> {
        // Editors often replace the file, so the parent directory is watched.
        let dir = match self.path.parent() {
            Some(dir) if dir.exists() => dir.to_path_buf(),
            _ => {
                tracing::debug!(path = ?self.path, "Config directory does not exist, not watching");
                return Ok(());
            }
        };

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = event_tx.send(event);
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = ?self.path, "Watching config file");

        while let Some(event) = event_rx.recv().await {
            if !self.is_relevant_event(&event) {
                continue;
            }

            // Let a burst of writes land before reading.
            time::sleep(self.debounce).await;
            while event_rx.try_recv().is_ok() {}

            self.reload().await;
        }

        return Ok(());
    }
}
