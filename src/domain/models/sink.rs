#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SinkName {
    Auto,
    Clipboard,
    Neovim,
    Stdout,
    Tmux,
    None,
}

impl SinkName {
    pub fn parse(text: String) -> Option<SinkName> {
        return SinkName::iter().find(|e| return e.to_string() == text);
    }
}

#[async_trait]
pub trait InputSink {
    /// Returns the name of the sink.
    fn name(&self) -> SinkName;

    /// Used at startup to verify the sink's target surface can be reached.
    async fn health_check(&self) -> Result<()>;

    /// Writes a rendered chunk into the target surface, leaving the cursor at
    /// the end of the inserted text. When `auto_send` is set, the sink also
    /// triggers the surface's send control once the host has settled.
    async fn inject(&self, text: &str, auto_send: bool) -> Result<()>;

    /// Waits for deferred work started by `inject` to finish. Called before
    /// exit so a pending auto-send is not dropped.
    #[allow(clippy::implicit_return)]
    async fn settle(&self) {}
}

pub type SinkBox = Box<dyn InputSink + Send + Sync>;
