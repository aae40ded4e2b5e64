#[cfg(test)]
#[path = "delivery_test.rs"]
mod tests;

use std::num::NonZeroUsize;

use super::template::render;
use super::text::normalize;
use super::text::split_at_nearest_newline;
use crate::configuration::SettingsBox;
use crate::domain::models::AffordanceBox;
use crate::domain::models::DeliveryDefaults;
use crate::domain::models::DeliveryRequest;
use crate::domain::models::DeliveryState;
use crate::domain::models::InjectMessage;
use crate::domain::models::SinkBox;

struct DeliverySession {
    request: DeliveryRequest,
    remaining_text: String,
    chunk_index: usize,
    state: DeliveryState,
}

/// Delivers one source text at a time into an input sink, a chunk per step.
///
/// The first chunk goes out as soon as a message is received. Every further
/// chunk waits for `advance`, which the continuation affordance triggers.
/// A new message always replaces the running session.
pub struct DeliveryController {
    sink: SinkBox,
    affordance: AffordanceBox,
    settings: SettingsBox,
    defaults: DeliveryDefaults,
    session: Option<DeliverySession>,
}

impl DeliveryController {
    pub fn new(
        sink: SinkBox,
        affordance: AffordanceBox,
        settings: SettingsBox,
        defaults: DeliveryDefaults,
    ) -> DeliveryController {
        return DeliveryController {
            sink,
            affordance,
            settings,
            defaults,
            session: None,
        };
    }

    pub fn state(&self) -> DeliveryState {
        if let Some(session) = &self.session {
            return session.state;
        }

        return DeliveryState::Idle;
    }

    /// Count of chunks delivered by the current session.
    pub fn chunk_index(&self) -> usize {
        if let Some(session) = &self.session {
            return session.chunk_index;
        }

        return 0;
    }

    pub fn remaining_text(&self) -> &str {
        if let Some(session) = &self.session {
            return &session.remaining_text;
        }

        return "";
    }

    /// Starts a new session from an inbound message. Messages without a
    /// title or text are ignored and leave any running session untouched.
    pub async fn receive(&mut self, message: InjectMessage) -> DeliveryState {
        if !message.is_deliverable() {
            tracing::debug!(
                has_title = !message.source.title.is_empty(),
                has_text = !message.source.text.is_empty(),
                "Ignoring inbound message"
            );
            return self.state();
        }

        self.affordance.remove();
        if let Some(previous) = self.session.take() {
            tracing::debug!(
                state = %previous.state,
                delivered = previous.chunk_index,
                "Replacing delivery session"
            );
        }

        let settings = self.settings.current();
        let request = DeliveryRequest::new(message, &settings, &self.defaults);
        let budget = request.max_chars_per_chunk;

        tracing::info!(
            title = request.source_title,
            url = request.source_url,
            chars = request.source_text.chars().count(),
            max_chars_per_chunk = budget.get(),
            auto_send = request.auto_send,
            "Starting delivery"
        );

        self.session = Some(DeliverySession {
            remaining_text: normalize(&request.source_text),
            request,
            chunk_index: 0,
            state: DeliveryState::Delivering,
        });

        self.step(budget).await;

        return self.state();
    }

    /// Delivers the next chunk. Only acts while awaiting continuation.
    pub async fn advance(&mut self) -> DeliveryState {
        if self.state() != DeliveryState::AwaitingContinuation {
            tracing::debug!(state = %self.state(), "Nothing to continue");
            return self.state();
        }

        self.affordance.remove();
        let budget = self.settings.current().max_chars_to_split;
        if let Some(session) = self.session.as_mut() {
            session.remaining_text = session.remaining_text.trim().to_string();
            session.state = DeliveryState::Delivering;
        }

        self.step(budget).await;

        return self.state();
    }

    /// Waits for deferred sink work, such as a pending auto-send.
    pub async fn settle(&self) {
        self.sink.settle().await;
    }

    async fn step(&mut self, budget: NonZeroUsize) {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return,
        };

        let (first, rest) = split_at_nearest_newline(&session.remaining_text, budget.get());
        let rendered = render(
            &session.request.prompt_template,
            &session.request.variables(first),
        );
        let rest = rest.to_string();
        let ordinal = session.chunk_index + 1;

        if let Err(err) = self
            .sink
            .inject(&rendered, session.request.auto_send)
            .await
        {
            tracing::warn!(
                err = ?err,
                sink = %self.sink.name(),
                part = ordinal,
                "Unable to deliver part, delivery stalled"
            );
            session.state = DeliveryState::Stalled;
            return;
        }

        tracing::debug!(
            part = ordinal,
            chars = rendered.chars().count(),
            remaining = rest.chars().count(),
            "Delivered part"
        );

        session.chunk_index = ordinal;
        if rest.trim().is_empty() {
            session.remaining_text = "".to_string();
            session.state = DeliveryState::Done;
            tracing::info!(parts = ordinal, "Delivery finished");
            return;
        }

        session.remaining_text = rest;
        session.state = DeliveryState::AwaitingContinuation;
        self.affordance.show(ordinal + 1);
    }
}
