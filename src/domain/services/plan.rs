#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::DeliveryController;
use crate::configuration::Settings;
use crate::domain::models::ContinuationAffordance;
use crate::domain::models::DeliveryDefaults;
use crate::domain::models::DeliveryState;
use crate::domain::models::InjectMessage;
use crate::domain::models::InputSink;
use crate::domain::models::SinkName;

#[derive(Clone, Default)]
struct CollectingSink {
    parts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl InputSink for CollectingSink {
    fn name(&self) -> SinkName {
        return SinkName::None;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, text: &str, _auto_send: bool) -> Result<()> {
        self.parts.lock().await.push(text.to_string());
        return Ok(());
    }
}

/// Shows nothing. `plan_chunks` advances on its own.
struct Eager {}

impl ContinuationAffordance for Eager {
    fn show(&mut self, _ordinal: usize) {}
    fn remove(&mut self) {}
}

/// Runs a full delivery of `text` without a target, returning the parts it
/// would have delivered in order.
pub async fn plan_chunks(text: &str, max_chars: NonZeroUsize) -> Vec<String> {
    let sink = CollectingSink::default();
    let mut controller = DeliveryController::new(
        Box::new(sink.clone()),
        Box::new(Eager {}),
        Box::new(Settings {
            lang: "".to_string(),
            max_chars_to_split: max_chars,
        }),
        DeliveryDefaults {
            prompt_template: "{{CONTENT}}".to_string(),
            auto_send: false,
        },
    );

    let mut state = controller
        .receive(InjectMessage::new("plan", text, ""))
        .await;
    while state == DeliveryState::AwaitingContinuation {
        state = controller.advance().await;
    }

    let parts = sink.parts.lock().await.clone();
    return parts;
}
