#[cfg(test)]
#[path = "inject_test.rs"]
mod tests;

use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Page content captured by the sender.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
}

/// A single inbound message, one JSON object per line on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectMessage {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_send: Option<bool>,
}

impl InjectMessage {
    pub fn new(title: &str, text: &str, url: &str) -> InjectMessage {
        return InjectMessage {
            source: Source {
                title: title.to_string(),
                text: text.to_string(),
                url: url.to_string(),
            },
            prompt: "".to_string(),
            auto_send: None,
        };
    }

    pub fn parse(line: &str) -> Result<InjectMessage> {
        let message: InjectMessage = serde_json::from_str(line.trim())?;
        return Ok(message);
    }

    /// Only messages carrying both a title and text start a delivery.
    pub fn is_deliverable(&self) -> bool {
        return !self.source.title.is_empty() && !self.source.text.is_empty();
    }
}
