#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;

use crate::configuration::language;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::configuration::Settings;
use crate::domain::models::InjectMessage;
use crate::domain::models::SinkName;
use crate::domain::services::plan;

/// What the process should do once the CLI has been parsed.
pub enum Launch {
    /// Deliver a single message, exiting once the session finishes.
    Deliver(InjectMessage),
    /// Accept messages over TCP until the user quits.
    Listen,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

/// Reads the source text from `--file`, or from stdin when no file (or `-`)
/// is given.
async fn read_source_text(matches: &ArgMatches) -> Result<String> {
    if let Some(file_path) = matches.get_one::<String>("file") {
        if file_path != "-" {
            return Ok(fs::read_to_string(file_path).await?);
        }
    }

    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    return Ok(text);
}

pub fn format_plan(chunks: &[String]) -> String {
    let total = chunks
        .iter()
        .map(|chunk| return chunk.chars().count())
        .sum::<usize>();

    let mut lines = chunks
        .iter()
        .enumerate()
        .map(|(idx, chunk)| {
            return format!("- part{}: {} chars", idx + 1, chunk.chars().count());
        })
        .collect::<Vec<String>>();

    lines.push(format!("{} parts, {total} chars", chunks.len()));

    return lines.join("\n");
}

fn arg_file() -> Arg {
    return Arg::new("file")
        .short('f')
        .long("file")
        .num_args(1)
        .help("File holding the page text to deliver. Reads stdin when omitted or set to '-'.");
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Morsel")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Morsel with environment variable RUST_LOG=morsel")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        )
        .subcommand(
            Command::new("language").about("Print the language resolved from the system locale.")
        );
}

fn subcommand_deliver() -> Command {
    return Command::new("deliver")
        .about("Deliver a page's text chunk by chunk, waiting for Enter before each next part.")
        .arg(arg_file())
        .arg(
            Arg::new("title")
                .long("title")
                .num_args(1)
                .required(true)
                .help("Title of the page, substituted for {{TITLE}}."),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .num_args(1)
                .default_value("")
                .help("URL of the page, substituted for {{URL}}."),
        );
}

fn subcommand_listen() -> Command {
    return Command::new("listen")
        .about("Accept JSON messages over TCP, one per line, starting a new delivery for each.");
}

fn subcommand_plan() -> Command {
    return Command::new("plan")
        .about("Print how a page's text would be split into parts without delivering it.")
        .arg(arg_file());
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("morsel")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_deliver())
        .subcommand(subcommand_listen())
        .subcommand(subcommand_plan())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("MORSEL_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Sink.to_string())
                .long(ConfigKey::Sink.to_string())
                .env("MORSEL_SINK")
                .num_args(1)
                .help(format!("The input surface each chunk is written into. 'auto' picks Neovim, tmux, the clipboard, then stdout. [default: {}]", Config::default(ConfigKey::Sink)))
                .value_parser(PossibleValuesParser::new(SinkName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Lang.to_string())
                .short('l')
                .long(ConfigKey::Lang.to_string())
                .env("MORSEL_LANG")
                .num_args(1)
                .help("Language substituted for {{SELECTED_LANGUAGE}}. Defaults to the system UI language.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::MaxCharsToSplit.to_string())
                .short('m')
                .long(ConfigKey::MaxCharsToSplit.to_string())
                .env("MORSEL_MAX_CHARS_TO_SPLIT")
                .num_args(1)
                .help(format!("Maximum characters of page text per part. [default: {}]", Config::default(ConfigKey::MaxCharsToSplit)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Prompt.to_string())
                .short('p')
                .long(ConfigKey::Prompt.to_string())
                .env("MORSEL_PROMPT")
                .num_args(1)
                .help("Prompt template used when a message doesn't carry one. Supports {{TITLE}}, {{CONTENT}}, {{URL}} and {{SELECTED_LANGUAGE}}.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AutoSend.to_string())
                .long(ConfigKey::AutoSend.to_string())
                .env("MORSEL_AUTO_SEND")
                .action(ArgAction::SetTrue)
                .help(format!("Submit each part once it has been written, unless a message says otherwise. [default: {}]", Config::default(ConfigKey::AutoSend)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SettleDelay.to_string())
                .long(ConfigKey::SettleDelay.to_string())
                .env("MORSEL_SETTLE_DELAY")
                .num_args(1)
                .help(format!("Milliseconds to wait after writing a part before submitting it. [default: {}]", Config::default(ConfigKey::SettleDelay)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TmuxTarget.to_string())
                .long(ConfigKey::TmuxTarget.to_string())
                .env("MORSEL_TMUX_TARGET")
                .num_args(1)
                .help("tmux target pane for the tmux sink, such as 'chat:0.1'.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ListenAddr.to_string())
                .long(ConfigKey::ListenAddr.to_string())
                .env("MORSEL_LISTEN_ADDR")
                .num_args(1)
                .help(format!("Address the listen command accepts messages on. [default: {}]", Config::default(ConfigKey::ListenAddr)))
                .global(true),
        );
}

pub async fn parse() -> Result<Option<Launch>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = dirs::cache_dir()
                        .unwrap_or_else(std::env::temp_dir)
                        .join("morsel/debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                Some(("language", _)) => {
                    println!("{}", language::system_ui_language());
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("plan", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let text = read_source_text(subcmd_matches).await?;
            let settings = Settings::from_config();
            let chunks = plan::plan_chunks(&text, settings.max_chars_to_split).await;
            println!("{}", format_plan(&chunks));
            return Ok(None);
        }
        Some(("deliver", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let text = read_source_text(subcmd_matches).await?;
            let title = subcmd_matches
                .get_one::<String>("title")
                .cloned()
                .unwrap_or_default();
            let url = subcmd_matches
                .get_one::<String>("url")
                .cloned()
                .unwrap_or_default();

            if text.trim().is_empty() {
                eprintln!("{}", "There is no text to deliver.".yellow());
                return Ok(None);
            }

            return Ok(Some(Launch::Deliver(InjectMessage::new(
                &title, &text, &url,
            ))));
        }
        Some(("listen", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Launch::Listen));
        }
        _ => {
            build().print_long_help()?;
            return Ok(None);
        }
    }
}
