#[cfg(test)]
#[path = "stdout_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::domain::models::InputSink;
use crate::domain::models::SinkName;

const SEPARATOR: &str = "--------------------------------";

pub fn format_chunk(text: &str) -> String {
    return format!("{SEPARATOR}\n{}\n{SEPARATOR}\n", text.trim_end_matches('\n'));
}

#[derive(Default)]
pub struct Stdout {}

#[async_trait]
impl InputSink for Stdout {
    fn name(&self) -> SinkName {
        return SinkName::Stdout;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, text: &str, auto_send: bool) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format_chunk(text).as_bytes()).await?;
        stdout.flush().await?;

        if auto_send {
            tracing::debug!("Auto-send has no effect on stdout");
        }

        return Ok(());
    }
}
