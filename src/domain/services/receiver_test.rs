use anyhow::bail;
use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use super::MessageReceiver;
use crate::domain::models::Action;
use crate::domain::models::InjectMessage;

#[test]
fn it_skips_blank_lines() -> Result<()> {
    assert!(MessageReceiver::parse_line("   ")?.is_none());
    return Ok(());
}

#[test]
fn it_rejects_invalid_json() {
    assert!(MessageReceiver::parse_line("{\"source\":").is_err());
}

#[tokio::test]
async fn it_forwards_valid_lines() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let input = [
        r#"{"source":{"title":"Ownership","text":"Body","url":"https://example.com"},"autoSend":true}"#,
        "",
        "not json",
        r#"{"source":{"title":"Borrowing","text":"More"}}"#,
    ]
    .join("\n");

    let count = MessageReceiver::read_lines(input.as_bytes(), &tx).await?;
    assert_eq!(count, 2);

    let mut titles = vec![];
    while let Ok(action) = rx.try_recv() {
        if let Action::Inbound(message) = action {
            titles.push(message.source.title.to_string());
            if message.source.title == "Ownership" {
                assert_eq!(message.auto_send, Some(true));
            }
        }
    }
    assert_eq!(titles, vec!["Ownership", "Borrowing"]);

    return Ok(());
}

#[tokio::test]
async fn it_accepts_messages_over_tcp() -> Result<()> {
    // Reserve a free port, then hand it to the receiver.
    let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let server = tokio::spawn(async move {
        return MessageReceiver::listen(&addr.to_string(), tx).await;
    });

    let mut stream = None;
    for _ in 0..50 {
        if let Ok(conn) = TcpStream::connect(addr).await {
            stream = Some(conn);
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
    let mut stream = match stream {
        Some(stream) => stream,
        None => bail!("Receiver never started listening"),
    };

    let line = serde_json::to_string(&InjectMessage::new("Ownership", "Body", ""))?;
    stream.write_all(format!("{line}\n").as_bytes()).await?;
    stream.shutdown().await?;

    let action = tokio::time::timeout(tokio::time::Duration::from_secs(5), rx.recv()).await?;
    match action {
        Some(Action::Inbound(message)) => assert_eq!(message.source.text, "Body"),
        _ => bail!("Expected an inbound message"),
    }

    server.abort();
    return Ok(());
}
