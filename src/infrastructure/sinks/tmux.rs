use std::env;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::deferred::DeferredTasks;
use super::process::run_command;
use crate::domain::models::InputSink;
use crate::domain::models::SinkName;

const BUFFER_NAME: &str = "morsel";

/// Pastes chunks into a tmux pane, such as one running a chat CLI.
pub struct Tmux {
    target: String,
    settle_delay: Duration,
    deferred: DeferredTasks,
}

impl Tmux {
    pub fn new(target: &str, settle_delay: Duration) -> Tmux {
        return Tmux {
            target: target.to_string(),
            settle_delay,
            deferred: DeferredTasks::default(),
        };
    }
}

#[async_trait]
impl InputSink for Tmux {
    fn name(&self) -> SinkName {
        return SinkName::Tmux;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.target.is_empty() {
            bail!("No tmux target configured, set tmux-target to a pane such as 'chat:0.1'")
        }
        if env::var("TMUX").is_err() {
            tracing::debug!("Not running within tmux, using the default tmux server");
        }

        run_command(
            "tmux",
            &["display-message", "-p", "-t", &self.target, "#{pane_id}"],
            None,
        )
        .await?;

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, text: &str, auto_send: bool) -> Result<()> {
        run_command("tmux", &["load-buffer", "-b", BUFFER_NAME, "-"], Some(text)).await?;
        run_command(
            "tmux",
            &["paste-buffer", "-p", "-d", "-b", BUFFER_NAME, "-t", &self.target],
            None,
        )
        .await?;

        if auto_send {
            let target = self.target.to_string();
            self.deferred
                .spawn_after(self.settle_delay, "tmux-send-enter", async move {
                    run_command("tmux", &["send-keys", "-t", &target, "Enter"], None).await?;
                    return Ok(());
                })
                .await;
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn settle(&self) {
        self.deferred.settle().await;
    }
}
