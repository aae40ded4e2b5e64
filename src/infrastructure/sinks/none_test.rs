use anyhow::Result;

use super::NoneSink;
use crate::domain::models::InputSink;

#[tokio::test]
async fn it_successfully_health_checks() -> Result<()> {
    NoneSink::default().health_check().await?;
    return Ok(());
}

#[tokio::test]
async fn it_returns_an_error_injecting() -> Result<()> {
    let err = NoneSink::default()
        .inject("part one", true)
        .await
        .unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"missing input target: the 'none' sink does not write anywhere. Consider the 'clipboard' or 'stdout' sink instead");
    return Ok(());
}
