#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::InputSink;
use crate::domain::models::SinkName;
use crate::domain::services::clipboard::ClipboardService;

#[derive(Default)]
pub struct Clipboard {}

#[async_trait]
impl InputSink for Clipboard {
    fn name(&self) -> SinkName {
        return SinkName::Clipboard;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if let Err(err) = ClipboardService::healthcheck() {
            return Err(anyhow! {format!("Clipboard sink failed to initialize: {err}")});
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, text: &str, auto_send: bool) -> Result<()> {
        ClipboardService::set(text.to_string()).await?;
        if auto_send {
            tracing::info!("Auto-send is not available for the clipboard sink");
        }

        return Ok(());
    }
}
