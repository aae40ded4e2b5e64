use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use test_utils::article_fixture;
use test_utils::unbroken_fixture;

use super::DeliveryController;
use crate::configuration::Settings;
use crate::configuration::SettingsProvider;
use crate::domain::models::ContinuationAffordance;
use crate::domain::models::DeliveryDefaults;
use crate::domain::models::DeliveryState;
use crate::domain::models::InjectMessage;
use crate::domain::models::InputSink;
use crate::domain::models::SinkName;

#[derive(Clone, Default)]
struct RecordingSink {
    injected: Arc<Mutex<Vec<(String, bool)>>>,
}

impl RecordingSink {
    fn texts(&self) -> Vec<String> {
        return self
            .injected
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| return text.to_string())
            .collect();
    }
}

#[async_trait]
impl InputSink for RecordingSink {
    fn name(&self) -> SinkName {
        return SinkName::Stdout;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, text: &str, auto_send: bool) -> Result<()> {
        self.injected
            .lock()
            .unwrap()
            .push((text.to_string(), auto_send));
        return Ok(());
    }
}

/// Fails every injection after the first `succeed` ones.
struct FlakySink {
    succeed: usize,
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl InputSink for FlakySink {
    fn name(&self) -> SinkName {
        return SinkName::None;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn inject(&self, _text: &str, _auto_send: bool) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls > self.succeed {
            bail!("prompt textarea not found");
        }
        return Ok(());
    }
}

#[derive(Default)]
struct AffordanceLog {
    visible: Option<usize>,
    shown: Vec<usize>,
    removals: usize,
    overlapped: bool,
}

#[derive(Clone, Default)]
struct RecordingAffordance {
    log: Arc<Mutex<AffordanceLog>>,
}

impl RecordingAffordance {
    fn visible(&self) -> Option<usize> {
        return self.log.lock().unwrap().visible;
    }

    fn shown(&self) -> Vec<usize> {
        return self.log.lock().unwrap().shown.clone();
    }
}

impl ContinuationAffordance for RecordingAffordance {
    fn show(&mut self, ordinal: usize) {
        let mut log = self.log.lock().unwrap();
        if log.visible.is_some() {
            log.overlapped = true;
        }
        log.visible = Some(ordinal);
        log.shown.push(ordinal);
    }

    fn remove(&mut self) {
        let mut log = self.log.lock().unwrap();
        if log.visible.take().is_some() {
            log.removals += 1;
        }
    }
}

#[derive(Clone)]
struct SharedSettings {
    settings: Arc<Mutex<Settings>>,
}

impl SharedSettings {
    fn new(max_chars: usize) -> SharedSettings {
        return SharedSettings {
            settings: Arc::new(Mutex::new(Settings {
                lang: "English".to_string(),
                max_chars_to_split: NonZeroUsize::new(max_chars).unwrap(),
            })),
        };
    }

    fn set(&self, lang: &str, max_chars: usize) {
        let mut settings = self.settings.lock().unwrap();
        settings.lang = lang.to_string();
        settings.max_chars_to_split = NonZeroUsize::new(max_chars).unwrap();
    }
}

impl SettingsProvider for SharedSettings {
    fn current(&self) -> Settings {
        return self.settings.lock().unwrap().clone();
    }
}

struct Harness {
    controller: DeliveryController,
    sink: RecordingSink,
    affordance: RecordingAffordance,
    settings: SharedSettings,
}

fn harness(max_chars: usize) -> Harness {
    let sink = RecordingSink::default();
    let affordance = RecordingAffordance::default();
    let settings = SharedSettings::new(max_chars);
    let controller = DeliveryController::new(
        Box::new(sink.clone()),
        Box::new(affordance.clone()),
        Box::new(settings.clone()),
        DeliveryDefaults {
            prompt_template: "{{CONTENT}}".to_string(),
            auto_send: false,
        },
    );

    return Harness {
        controller,
        sink,
        affordance,
        settings,
    };
}

fn message(text: &str) -> InjectMessage {
    return InjectMessage::new("Ownership", text, "https://example.com/ownership");
}

mod receive {
    use super::*;

    #[tokio::test]
    async fn it_delivers_short_text_in_one_part() {
        let mut h = harness(100);
        let state = h.controller.receive(message("Short text.")).await;

        assert_eq!(state, DeliveryState::Done);
        assert_eq!(h.sink.texts(), vec!["Short text."]);
        assert_eq!(h.controller.chunk_index(), 1);
        assert_eq!(h.controller.remaining_text(), "");
        assert!(h.affordance.shown().is_empty());
        assert_eq!(h.affordance.visible(), None);
    }

    #[tokio::test]
    async fn it_splits_at_the_newline_and_offers_part_two() {
        let mut h = harness(6);
        let state = h.controller.receive(message("AAAA\nBBBB")).await;

        assert_eq!(state, DeliveryState::AwaitingContinuation);
        assert_eq!(h.sink.texts(), vec!["AAAA"]);
        assert_eq!(h.controller.remaining_text(), "\nBBBB");
        assert_eq!(h.affordance.visible(), Some(2));
    }

    #[tokio::test]
    async fn it_normalizes_before_splitting() {
        let mut h = harness(100);
        h.controller.receive(message("one   \n\n\ntwo\t")).await;

        assert_eq!(h.sink.texts(), vec!["one\ntwo"]);
    }

    #[tokio::test]
    async fn it_renders_the_message_prompt() {
        let mut h = harness(100);
        let mut msg = message("Body");
        msg.prompt =
            "Summarize {{TITLE}} from {{URL}} in {{SELECTED_LANGUAGE}}: {{CONTENT}}".to_string();
        msg.auto_send = Some(true);
        h.controller.receive(msg).await;

        let injected = h.sink.injected.lock().unwrap().clone();
        insta::assert_snapshot!(injected[0].0, @"Summarize Ownership from https://example.com/ownership in English: Body");
        assert!(injected[0].1);
    }

    #[tokio::test]
    async fn it_does_not_expand_placeholders_in_content() {
        let mut h = harness(100);
        let mut msg = message("{{TITLE}} nested");
        msg.prompt = "{{TITLE}}: {{CONTENT}}".to_string();
        h.controller.receive(msg).await;

        assert_eq!(h.sink.texts(), vec!["Ownership: {{TITLE}} nested"]);
    }

    #[tokio::test]
    async fn it_ignores_messages_without_text() {
        let mut h = harness(100);
        let state = h.controller.receive(message("")).await;

        assert_eq!(state, DeliveryState::Idle);
        assert!(h.sink.texts().is_empty());
        assert!(h.affordance.shown().is_empty());
    }

    #[tokio::test]
    async fn it_ignores_messages_without_title() {
        let mut h = harness(100);
        let state = h
            .controller
            .receive(InjectMessage::new("", "Some text", ""))
            .await;

        assert_eq!(state, DeliveryState::Idle);
        assert!(h.sink.texts().is_empty());
    }

    #[tokio::test]
    async fn it_keeps_the_running_session_for_ignored_messages() {
        let mut h = harness(6);
        h.controller.receive(message("AAAA\nBBBB")).await;
        let state = h.controller.receive(message("")).await;

        assert_eq!(state, DeliveryState::AwaitingContinuation);
        assert_eq!(h.affordance.visible(), Some(2));
    }

    #[tokio::test]
    async fn it_replaces_a_waiting_session() {
        let mut h = harness(6);
        h.controller.receive(message("AAAA\nBBBB")).await;
        assert_eq!(h.affordance.visible(), Some(2));

        let state = h.controller.receive(message("CCCCCC\nDD")).await;

        assert_eq!(state, DeliveryState::AwaitingContinuation);
        assert_eq!(h.sink.texts(), vec!["AAAA", "CCCCCC"]);
        assert_eq!(h.controller.chunk_index(), 1);
        assert_eq!(h.controller.remaining_text(), "\nDD");
        assert_eq!(h.affordance.visible(), Some(2));

        let log = h.affordance.log.lock().unwrap();
        assert!(!log.overlapped);
        assert_eq!(log.removals, 1);
    }

    #[tokio::test]
    async fn it_stalls_when_the_sink_has_no_target() {
        let affordance = RecordingAffordance::default();
        let mut controller = DeliveryController::new(
            Box::new(FlakySink {
                succeed: 0,
                calls: Arc::new(Mutex::new(0)),
            }),
            Box::new(affordance.clone()),
            Box::new(SharedSettings::new(6)),
            DeliveryDefaults {
                prompt_template: "{{CONTENT}}".to_string(),
                auto_send: false,
            },
        );

        let state = controller.receive(message("AAAA\nBBBB")).await;

        assert_eq!(state, DeliveryState::Stalled);
        assert_eq!(controller.chunk_index(), 0);
        assert!(affordance.shown().is_empty());

        let state = controller.advance().await;
        assert_eq!(state, DeliveryState::Stalled);
    }
}

mod advance {
    use super::*;

    #[tokio::test]
    async fn it_delivers_hard_split_parts_until_done() {
        let mut h = harness(6);
        let text = unbroken_fixture(20);
        let mut state = h.controller.receive(message(&text)).await;

        let mut steps = 1;
        while state == DeliveryState::AwaitingContinuation {
            state = h.controller.advance().await;
            steps += 1;
            assert!(steps < 10);
        }

        assert_eq!(state, DeliveryState::Done);
        let sizes = h
            .sink
            .texts()
            .iter()
            .map(|text| return text.chars().count())
            .collect::<Vec<usize>>();
        assert_eq!(sizes, vec![6, 6, 6, 2]);
        assert_eq!(h.sink.texts().concat(), text);
        assert_eq!(h.affordance.shown(), vec![2, 3, 4]);
        assert_eq!(h.affordance.visible(), None);
    }

    #[tokio::test]
    async fn it_trims_the_remainder_before_each_part() {
        let mut h = harness(6);
        h.controller.receive(message("AAAA\n  BBBB")).await;
        let state = h.controller.advance().await;

        assert_eq!(state, DeliveryState::Done);
        assert_eq!(h.sink.texts(), vec!["AAAA", "BBBB"]);
    }

    #[tokio::test]
    async fn it_finishes_on_whitespace_only_remainders() {
        let mut h = harness(4);
        let state = h.controller.receive(message("AAAA\n")).await;

        assert_eq!(state, DeliveryState::Done);
        assert_eq!(h.sink.texts(), vec!["AAAA"]);
        assert!(h.affordance.shown().is_empty());
    }

    #[tokio::test]
    async fn it_does_nothing_while_idle_or_done() {
        let mut h = harness(100);
        assert_eq!(h.controller.advance().await, DeliveryState::Idle);

        h.controller.receive(message("Short text.")).await;
        assert_eq!(h.controller.advance().await, DeliveryState::Done);
        assert_eq!(h.sink.texts().len(), 1);
    }

    #[tokio::test]
    async fn it_cannot_advance_twice_from_one_affordance() {
        let mut h = harness(6);
        h.controller.receive(message("AAAA\nBBBB")).await;
        h.controller.advance().await;
        let state = h.controller.advance().await;

        assert_eq!(state, DeliveryState::Done);
        assert_eq!(h.sink.texts(), vec!["AAAA", "BBBB"]);
    }

    #[tokio::test]
    async fn it_uses_the_current_budget_and_the_session_language() {
        let mut h = harness(6);
        let mut msg = message("AAAA\nBBBBBBBBBB");
        msg.prompt = "[{{SELECTED_LANGUAGE}}] {{CONTENT}}".to_string();
        h.controller.receive(msg).await;

        h.settings.set("French", 100);
        let state = h.controller.advance().await;

        assert_eq!(state, DeliveryState::Done);
        assert_eq!(
            h.sink.texts(),
            vec!["[English] AAAA", "[English] BBBBBBBBBB"]
        );
    }

    #[tokio::test]
    async fn it_stalls_mid_session() {
        let affordance = RecordingAffordance::default();
        let mut controller = DeliveryController::new(
            Box::new(FlakySink {
                succeed: 1,
                calls: Arc::new(Mutex::new(0)),
            }),
            Box::new(affordance.clone()),
            Box::new(SharedSettings::new(6)),
            DeliveryDefaults {
                prompt_template: "{{CONTENT}}".to_string(),
                auto_send: false,
            },
        );

        controller.receive(message("AAAA\nBBBB")).await;
        let state = controller.advance().await;

        assert_eq!(state, DeliveryState::Stalled);
        assert_eq!(controller.chunk_index(), 1);
        assert_eq!(affordance.shown(), vec![2]);
        assert_eq!(affordance.visible(), None);
    }

    #[tokio::test]
    async fn it_delivers_a_whole_article_with_one_affordance_at_a_time() {
        let mut h = harness(120);
        let mut state = h.controller.receive(message(article_fixture())).await;
        let mut last_remaining = h.controller.remaining_text().len();

        while state == DeliveryState::AwaitingContinuation {
            state = h.controller.advance().await;
            let remaining = h.controller.remaining_text().len();
            assert!(remaining < last_remaining);
            last_remaining = remaining;
        }

        assert_eq!(state, DeliveryState::Done);
        let shown = h.affordance.shown();
        assert_eq!(shown.len() + 1, h.sink.texts().len());
        assert!(shown.windows(2).all(|pair| return pair[1] == pair[0] + 1));
        assert!(!h.affordance.log.lock().unwrap().overlapped);
        for text in h.sink.texts() {
            assert!(text.chars().count() <= 120);
        }
    }
}
