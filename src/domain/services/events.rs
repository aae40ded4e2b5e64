#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::domain::models::Action;

/// Turns keyboard input from the controlling terminal into actions.
pub struct EventsService {}

impl EventsService {
    pub fn handle_crossterm(event: CrosstermEvent) -> Option<Action> {
        let keyevent = match event {
            CrosstermEvent::Key(keyevent) => keyevent,
            _ => return None,
        };

        if keyevent.kind != KeyEventKind::Press {
            return None;
        }

        match keyevent.code {
            KeyCode::Enter => {
                return Some(Action::Continue());
            }
            KeyCode::Char('q') => {
                return Some(Action::Quit());
            }
            KeyCode::Char('c') if keyevent.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(Action::Quit());
            }
            _ => {
                return None;
            }
        }
    }

    pub async fn start(tx: mpsc::UnboundedSender<Action>) -> Result<()> {
        let mut crossterm_events = EventStream::new();

        while let Some(event) = crossterm_events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(err = ?err, "Keyboard input is unavailable");
                    return Ok(());
                }
            };

            if let Some(action) = EventsService::handle_crossterm(event) {
                if tx.send(action).is_err() {
                    return Ok(());
                }
            }
        }

        return Ok(());
    }
}
