#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use owo_colors::OwoColorize;
use owo_colors::Stream;

use crate::domain::models::ContinuationAffordance;

pub fn label(ordinal: usize) -> String {
    return format!("More.. part{ordinal}");
}

/// Prints the continuation prompt to stderr, leaving stdout to the sink.
#[derive(Default)]
pub struct TerminalAffordance {
    visible: Option<usize>,
}

impl ContinuationAffordance for TerminalAffordance {
    fn show(&mut self, ordinal: usize) {
        if let Some(previous) = self.visible {
            tracing::warn!(previous, ordinal, "Affordance shown while one is visible");
        }
        self.visible = Some(ordinal);

        eprintln!(
            "{} {}",
            label(ordinal).if_supports_color(Stream::Stderr, |text| return text.cyan()),
            "[Enter to continue, q to quit]"
                .if_supports_color(Stream::Stderr, |text| return text.dimmed())
        );
    }

    fn remove(&mut self) {
        if let Some(ordinal) = self.visible.take() {
            tracing::debug!(ordinal, "Removed affordance");
        }
    }
}
