use anyhow::Result;

use super::SinkManager;
use super::SinkOptions;
use crate::domain::models::SinkName;

#[test]
fn it_prefers_neovim() {
    let res = SinkManager::detect_from(true, true, true, true);
    assert_eq!(res, SinkName::Neovim);
}

#[test]
fn it_needs_a_target_for_tmux() {
    assert_eq!(
        SinkManager::detect_from(false, true, true, true),
        SinkName::Tmux
    );
    assert_eq!(
        SinkManager::detect_from(false, true, false, true),
        SinkName::Clipboard
    );
}

#[test]
fn it_falls_back_to_stdout() {
    let res = SinkManager::detect_from(false, false, true, false);
    assert_eq!(res, SinkName::Stdout);
}

#[test]
fn it_keeps_explicit_sinks() {
    let res = SinkManager::resolve(SinkName::Tmux, &SinkOptions::default());
    assert_eq!(res, SinkName::Tmux);
}

#[test]
fn it_builds_each_named_sink() -> Result<()> {
    let options = SinkOptions {
        tmux_target: "chat:0.1".to_string(),
        ..SinkOptions::default()
    };

    for name in [
        SinkName::Clipboard,
        SinkName::Neovim,
        SinkName::None,
        SinkName::Stdout,
        SinkName::Tmux,
    ] {
        assert_eq!(SinkManager::get(name, &options)?.name(), name);
    }

    return Ok(());
}
