#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod clipboard;
mod deferred;
pub mod neovim;
pub mod none;
mod process;
pub mod stdout;
pub mod tmux;

use std::env;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::SinkBox;
use crate::domain::models::SinkName;
use crate::domain::services::clipboard::ClipboardService;

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// Sink settings that don't change while the process runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkOptions {
    pub settle_delay: Duration,
    pub tmux_target: String,
}

impl Default for SinkOptions {
    fn default() -> SinkOptions {
        return SinkOptions {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            tmux_target: "".to_string(),
        };
    }
}

impl SinkOptions {
    pub fn from_config() -> SinkOptions {
        let settle_delay = Config::get(ConfigKey::SettleDelay)
            .trim()
            .parse::<u64>()
            .unwrap_or(DEFAULT_SETTLE_DELAY_MS);

        return SinkOptions {
            settle_delay: Duration::from_millis(settle_delay),
            tmux_target: Config::get(ConfigKey::TmuxTarget),
        };
    }
}

pub struct SinkManager {}

impl SinkManager {
    /// Picks a sink from what the environment offers: Neovim first, then a
    /// configured tmux pane, then the clipboard, then stdout.
    pub fn detect_from(nvim: bool, tmux: bool, tmux_target: bool, clipboard: bool) -> SinkName {
        if nvim {
            return SinkName::Neovim;
        }

        if tmux && tmux_target {
            return SinkName::Tmux;
        }

        if clipboard {
            return SinkName::Clipboard;
        }

        return SinkName::Stdout;
    }

    pub fn resolve(name: SinkName, options: &SinkOptions) -> SinkName {
        if name != SinkName::Auto {
            return name;
        }

        let res = SinkManager::detect_from(
            env::var("NVIM").is_ok(),
            env::var("TMUX").is_ok(),
            !options.tmux_target.is_empty(),
            ClipboardService::healthcheck().is_ok(),
        );
        tracing::debug!(sink = %res, "Detected sink");

        return res;
    }

    pub fn get(name: SinkName, options: &SinkOptions) -> Result<SinkBox> {
        let name = SinkManager::resolve(name, options);

        if name == SinkName::Clipboard {
            return Ok(Box::<clipboard::Clipboard>::default());
        }

        if name == SinkName::Neovim {
            return Ok(Box::new(neovim::Neovim::new(options.settle_delay)));
        }

        if name == SinkName::None {
            return Ok(Box::<none::NoneSink>::default());
        }

        if name == SinkName::Stdout {
            return Ok(Box::<stdout::Stdout>::default());
        }

        if name == SinkName::Tmux {
            return Ok(Box::new(tmux::Tmux::new(
                &options.tmux_target,
                options.settle_delay,
            )));
        }

        bail!(format!("No sink implemented for {name}"))
    }
}
