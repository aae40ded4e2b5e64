#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

/// A clipboard write and the channel its outcome is reported on.
pub struct ClipboardRequest {
    text: String,
    reply: oneshot::Sender<Result<()>>,
}

pub type ClipboardSender = mpsc::UnboundedSender<ClipboardRequest>;
pub type ClipboardReceiver = mpsc::UnboundedReceiver<ClipboardRequest>;

static SENDER: OnceCell<ClipboardSender> = OnceCell::new();

pub trait ClipboardBackend {
    fn set_text(&mut self, text: String) -> Result<()>;
}

impl ClipboardBackend for arboard::Clipboard {
    fn set_text(&mut self, text: String) -> Result<()> {
        arboard::Clipboard::set_text(self, text)?;
        return Ok(());
    }
}

/// Holds the system clipboard for the lifetime of the process, as X11
/// clears contents once their owner drops.
pub struct ClipboardService {}

impl ClipboardService {
    /// Registers the sender so `set` works before `start` is first polled.
    pub fn init() -> Result<ClipboardReceiver> {
        let (tx, rx) = mpsc::unbounded_channel::<ClipboardRequest>();
        if SENDER.set(tx).is_err() {
            return Err(anyhow!("Clipboard service is already initialized."));
        }

        return Ok(rx);
    }

    pub async fn start(rx: ClipboardReceiver) -> Result<()> {
        match arboard::Clipboard::new() {
            Ok(clipboard) => {
                ClipboardService::serve(clipboard, rx).await;
            }
            Err(err) => {
                tracing::warn!(err = ?err, "Clipboard is unavailable");
                ClipboardService::serve(Unavailable {}, rx).await;
            }
        }

        return Ok(());
    }

    /// Applies writes until every sender is gone. Failures go back to the
    /// caller and never end the loop.
    pub async fn serve<B: ClipboardBackend>(mut backend: B, mut rx: ClipboardReceiver) {
        while let Some(request) = rx.recv().await {
            let res = backend.set_text(request.text);
            if let Err(err) = &res {
                tracing::warn!(err = ?err, "Clipboard write failed");
            }
            let _ = request.reply.send(res);
        }
    }

    pub fn healthcheck() -> Result<()> {
        if SENDER.get().is_some() {
            return Ok(());
        }

        arboard::Clipboard::new()?;
        return Ok(());
    }

    /// Queues `text` on `tx` and waits for the write to finish.
    pub async fn send(tx: &ClipboardSender, text: String) -> Result<()> {
        let (reply, outcome) = oneshot::channel::<Result<()>>();
        if tx.send(ClipboardRequest { text, reply }).is_err() {
            return Err(anyhow!("Clipboard service has stopped."));
        }

        return outcome
            .await
            .unwrap_or_else(|_| return Err(anyhow!("Clipboard service has stopped.")));
    }

    pub async fn set(text: String) -> Result<()> {
        if let Some(tx) = SENDER.get() {
            return ClipboardService::send(tx, text).await;
        }

        return Err(anyhow!("Clipboard service is not initialized."));
    }
}

struct Unavailable {}

impl ClipboardBackend for Unavailable {
    fn set_text(&mut self, _text: String) -> Result<()> {
        return Err(anyhow!("Clipboard is unavailable."));
    }
}
