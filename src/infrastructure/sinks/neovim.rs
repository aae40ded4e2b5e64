#[cfg(test)]
#[path = "neovim_test.rs"]
mod tests;

use std::env;
use std::future::Future;
use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::deferred::DeferredTasks;
use super::process::run_command;
use crate::domain::models::InputSink;
use crate::domain::models::SinkName;

/// Vimscript expression pasting the lines of `path` at the cursor.
pub fn paste_expr(path: &str) -> String {
    return format!(
        "luaeval('vim.paste(vim.fn.readfile(_A), -1)', '{}')",
        path.replace('\'', "''")
    );
}

/// Writes `text` to `path`, hands the path to `paste`, and removes the file
/// afterwards whether or not the paste worked.
pub async fn with_temp_file<F, Fut>(path: &path::Path, text: &str, paste: F) -> Result<()>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let res = write_and_paste(path, text, paste).await;
    if let Err(err) = fs::remove_file(path).await {
        tracing::debug!(err = ?err, path = ?path, "Unable to remove temp file");
    }

    return res;
}

async fn write_and_paste<F, Fut>(path: &path::Path, text: &str, paste: F) -> Result<()>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut file = File::create(path).await?;
    file.write_all(text.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);

    paste(path.to_string_lossy().to_string()).await?;
    return Ok(());
}

async fn remote(server: &str, flag: &str, arg: &str) -> Result<String> {
    return run_command("nvim", &["--headless", "--server", server, flag, arg], None).await;
}

/// Pastes chunks into the Neovim instance owning `$NVIM`.
pub struct Neovim {
    settle_delay: Duration,
    deferred: DeferredTasks,
}

impl Neovim {
    pub fn new(settle_delay: Duration) -> Neovim {
        return Neovim {
            settle_delay,
            deferred: DeferredTasks::default(),
        };
    }
}

#[async_trait]
impl InputSink for Neovim {
    fn name(&self) -> SinkName {
        return SinkName::Neovim;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if env::var("NVIM").is_err() {
            bail!("Not running within a Neovim terminal")
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, text: &str, auto_send: bool) -> Result<()> {
        let server = env::var("NVIM")?;

        let temp_file_path = env::temp_dir().join(format!("morsel-chunk-{}", std::process::id()));
        with_temp_file(&temp_file_path, text, |path| {
            let server = server.to_string();
            return async move {
                return remote(&server, "--remote-expr", &paste_expr(&path)).await;
            };
        })
        .await?;

        if auto_send {
            self.deferred
                .spawn_after(self.settle_delay, "neovim-send-enter", async move {
                    remote(&server, "--remote-send", "<CR>").await?;
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
