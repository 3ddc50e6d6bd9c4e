//! chatgpt-relay — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Resolve the model catalog (remote listing or fallback)
//!   6. Build provider, chat command and before-send hooks
//!   7. Run the console channel and the Ctrl-C watcher until either ends

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chatgpt_relay::error::AppError;
use chatgpt_relay::llm::{fetch_available_models, providers};
use chatgpt_relay::subsystems::chat::ChatCommand;
use chatgpt_relay::subsystems::comms::{self, BeforeSend};
use chatgpt_relay::subsystems::render::{CardStyle, PictureMode, ScreenshotRenderer};
use chatgpt_relay::subsystems::runtime::{CtrlCWatcher, spawn_components};
use chatgpt_relay::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bot_name = %config.bot_name,
        work_dir = %config.work_dir.display(),
        profile = %config.llm.profile,
        provider = %config.llm.provider,
        model = %config.llm.model,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

    let catalog = fetch_available_models(&client, &config.catalog.url, &config.catalog.fallback).await;
    info!(models = catalog.len(), source = ?catalog.source(), "model catalog resolved");

    if args.list_models {
        for model in catalog.models() {
            println!("{model}");
        }
        return Ok(());
    }

    if !catalog.contains(&config.llm.model) {
        warn!(model = %config.llm.model, "configured model is not in the model catalog");
    }

    let provider = providers::build(&config.llm).map_err(|e| AppError::Config(e.to_string()))?;
    info!(provider = provider.name(), "llm provider ready");

    let command = Arc::new(ChatCommand::new(config.chat.clone(), config.llm.clone(), provider));

    let renderer = Arc::new(ScreenshotRenderer::new(client, config.render.endpoint.clone()));
    let hooks: Vec<Arc<dyn BeforeSend>> = vec![Arc::new(PictureMode::new(
        config.chat.picture_mode,
        CardStyle::from(&config.render),
        renderer,
    ))];

    let mut components = comms::channels(&config, command, hooks);
    components.push(Box::new(CtrlCWatcher));

    let result = spawn_components(components, CancellationToken::new()).join().await;

    info!("shutdown complete");
    result
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    list_models: bool,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut list_models = false;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: chatgpt-relay [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                println!("      --list-models          Print the model catalog and exit");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--list-models" => list_models = true,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs {
        log_level: logger::level_for_verbosity(verbosity),
        config_path,
        list_models,
    }
}
