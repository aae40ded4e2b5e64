#[cfg(test)]
#[path = "receiver_test.rs"]
mod tests;

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::InjectMessage;

/// Accepts inject messages as JSON lines and forwards them to the actions
/// loop.
pub struct MessageReceiver {}

impl MessageReceiver {
    /// Parses a single line. Blank lines yield `None` rather than an error.
    pub fn parse_line(line: &str) -> Result<Option<InjectMessage>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        return Ok(Some(InjectMessage::parse(line)?));
    }

    /// Forwards every valid message read from `reader` until EOF. Invalid
    /// lines are logged and skipped. Returns the number of messages sent.
    pub async fn read_lines<R: AsyncBufRead + Unpin>(
        reader: R,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<usize> {
        let mut lines = reader.lines();
        let mut count = 0;

        while let Some(line) = lines.next_line().await? {
            match MessageReceiver::parse_line(&line) {
                Ok(Some(message)) => {
                    tx.send(Action::Inbound(message))?;
                    count += 1;
                }
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(err = ?err, "Ignoring invalid inbound message");
                }
            }
        }

        return Ok(count);
    }

    pub async fn listen(addr: &str, tx: mpsc::UnboundedSender<Action>) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = ?listener.local_addr()?, "Listening for messages");

        loop {
            let (stream, peer) = listener.accept().await?;
            tracing::debug!(peer = ?peer, "Accepted connection");

            let conn_tx = tx.clone();
            tokio::spawn(async move {
                let res = MessageReceiver::read_lines(BufReader::new(stream), &conn_tx).await;
                match res {
                    Ok(count) => {
                        tracing::debug!(peer = ?peer, messages = count, "Connection closed");
                    }
                    Err(err) => {
                        tracing::warn!(peer = ?peer, err = ?err, "Connection failed");
                    }
                }
            });
        }
    }
}
