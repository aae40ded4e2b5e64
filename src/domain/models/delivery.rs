#[cfg(test)]
#[path = "delivery_test.rs"]
mod tests;

use std::num::NonZeroUsize;

use super::InjectMessage;
use crate::configuration::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DeliveryState {
    Idle,
    Delivering,
    AwaitingContinuation,
    Done,
    /// The sink could not reach its target. Only a new inbound message
    /// starts over.
    Stalled,
}

impl DeliveryState {
    pub fn is_finished(&self) -> bool {
        return *self != DeliveryState::AwaitingContinuation
            && *self != DeliveryState::Delivering;
    }
}

/// Values substituted into a prompt template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateVariables {
    pub title: String,
    pub content: String,
    pub url: String,
    pub selected_language: String,
}

impl TemplateVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "TITLE" => return Some(&self.title),
            "CONTENT" => return Some(&self.content),
            "URL" => return Some(&self.url),
            "SELECTED_LANGUAGE" => return Some(&self.selected_language),
            _ => return None,
        }
    }
}

/// Fallbacks for fields an inbound message may leave out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryDefaults {
    pub prompt_template: String,
    pub auto_send: bool,
}

/// Everything a delivery session needs, fixed when the session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub source_text: String,
    pub source_title: String,
    pub source_url: String,
    pub prompt_template: String,
    pub selected_language: String,
    pub max_chars_per_chunk: NonZeroUsize,
    pub auto_send: bool,
}

impl DeliveryRequest {
    pub fn new(
        message: InjectMessage,
        settings: &Settings,
        defaults: &DeliveryDefaults,
    ) -> DeliveryRequest {
        let mut prompt_template = message.prompt;
        if prompt_template.is_empty() {
            prompt_template = defaults.prompt_template.to_string();
        }

        return DeliveryRequest {
            source_text: message.source.text,
            source_title: message.source.title,
            source_url: message.source.url,
            prompt_template,
            selected_language: settings.lang.to_string(),
            max_chars_per_chunk: settings.max_chars_to_split,
            auto_send: message.auto_send.unwrap_or(defaults.auto_send),
        };
    }

    /// Binds `content` alongside the values held constant for the session.
    pub fn variables(&self, content: &str) -> TemplateVariables {
        return TemplateVariables {
            title: self.source_title.to_string(),
            content: content.to_string(),
            url: self.source_url.to_string(),
            selected_language: self.selected_language.to_string(),
        };
    }
}
