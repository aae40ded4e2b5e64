#[cfg(test)]
#[path = "none_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::InputSink;
use crate::domain::models::SinkName;

#[derive(Default)]
pub struct NoneSink {}

#[async_trait]
impl InputSink for NoneSink {
    fn name(&self) -> SinkName {
        return SinkName::None;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, _text: &str, _auto_send: bool) -> Result<()> {
        bail!("missing input target: the 'none' sink does not write anywhere. Consider the 'clipboard' or 'stdout' sink instead")
    }
}
