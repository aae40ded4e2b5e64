#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tokio::task;

use crate::application::cli;
use crate::application::cli::Launch;
use crate::application::ui::TerminalAffordance;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::configuration::ConfigWatcher;
use crate::configuration::Settings;
use crate::configuration::SettingsOverrides;
use crate::domain::models::Action;
use crate::domain::models::DeliveryDefaults;
use crate::domain::models::SinkName;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::events::EventsService;
use crate::domain::services::receiver::MessageReceiver;
use crate::domain::services::template::DEFAULT_PROMPT_TEMPLATE;
use crate::domain::services::DeliveryController;
use crate::infrastructure::sinks::SinkManager;
use crate::infrastructure::sinks::SinkOptions;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        format!(
            "Oh no! Morsel has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
            err
        )
        .red()
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn delivery_defaults() -> DeliveryDefaults {
    let mut prompt_template = Config::get(ConfigKey::Prompt);
    if prompt_template.trim().is_empty() {
        prompt_template = DEFAULT_PROMPT_TEMPLATE.to_string();
    }

    return DeliveryDefaults {
        prompt_template,
        auto_send: Config::get_bool(ConfigKey::AutoSend),
    };
}

async fn run(launch: Launch) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut background_futures = task::JoinSet::<Result<()>>::new();

    if let Err(clipboard_err) = ClipboardService::healthcheck() {
        tracing::warn!(err = ?clipboard_err, "Clipboard service is unable to start")
    } else {
        let clipboard_rx = ClipboardService::init()?;
        background_futures.spawn(async move {
            return ClipboardService::start(clipboard_rx).await;
        });
    }

    let options = SinkOptions::from_config();
    let sink_name = SinkName::parse(Config::get(ConfigKey::Sink)).unwrap_or(SinkName::Auto);
    let sink = SinkManager::get(sink_name, &options)?;
    if let Err(err) = sink.health_check().await {
        tracing::warn!(err = ?err, sink = %sink.name(), "Sink health check failed");
        eprintln!("{}", format!("Warning: {err}").yellow());
    }

    let (watcher, settings) = ConfigWatcher::new(
        Config::config_file_path(),
        SettingsOverrides::from_config(),
        Settings::from_config(),
    );
    background_futures.spawn(async move {
        return watcher.start().await;
    });

    let events_tx = action_tx.clone();
    background_futures.spawn(async move {
        return EventsService::start(events_tx).await;
    });

    let exit_when_finished = match launch {
        Launch::Deliver(message) => {
            action_tx.send(Action::Inbound(message))?;
            true
        }
        Launch::Listen => {
            let listen_tx = action_tx.clone();
            background_futures.spawn(async move {
                return MessageReceiver::listen(&Config::get(ConfigKey::ListenAddr), listen_tx)
                    .await;
            });
            false
        }
    };

    tracing::info!(
        sink = %sink.name(),
        exit_when_finished,
        "Morsel started"
    );

    let mut controller = DeliveryController::new(
        sink,
        Box::<TerminalAffordance>::default(),
        Box::new(settings),
        delivery_defaults(),
    );

    {
        let actions = ActionsService::start(&mut controller, &mut action_rx, exit_when_finished);
        tokio::pin!(actions);

        loop {
            tokio::select! {
                res = &mut actions => {
                    res?;
                    break;
                }
                Some(res) = background_futures.join_next() => {
                    res??;
                }
            }
        }
    }

    controller.settle().await;
    background_futures.abort_all();

    return Ok(());
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("MORSEL_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("morsel")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("morsel")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let launch = match cli::parse().await {
        Ok(Some(launch)) => launch,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    if let Err(err) = run(launch).await {
        handle_error(err);
    }

    drop(_guard);
    process::exit(0);
}
