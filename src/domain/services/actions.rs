#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use super::DeliveryController;
use crate::domain::models::Action;

pub struct ActionsService {}

impl ActionsService {
    /// Drives the controller from incoming actions until the channel closes
    /// or the user quits. With `exit_when_finished`, also returns once a
    /// delivery is no longer waiting on the user.
    pub async fn start(
        controller: &mut DeliveryController,
        rx: &mut mpsc::UnboundedReceiver<Action>,
        exit_when_finished: bool,
    ) -> Result<()> {
        loop {
            let action = match rx.recv().await {
                Some(action) => action,
                None => return Ok(()),
            };

            let state = match action {
                Action::Inbound(message) => controller.receive(message).await,
                Action::Continue() => controller.advance().await,
                Action::Quit() => {
                    tracing::debug!(
                        state = %controller.state(),
                        delivered = controller.chunk_index(),
                        remaining = controller.remaining_text().chars().count(),
                        "Quit requested"
                    );
                    return Ok(());
                }
            };

            if exit_when_finished && state.is_finished() {
                return Ok(());
            }
        }
    }
}
