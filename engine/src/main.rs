// devcrew
// Main entry point for the devcrew binary

use clap::Parser;
use colored::Colorize;
use devcrew_engine::cli::{Cli, Command, ConfigAction};
use devcrew_engine::config::Config;
use devcrew_engine::handlers::{
    handle_agents, handle_build, handle_chat, handle_config_set_key, handle_config_set_model,
    handle_config_show, handle_config_validate, handle_init, hint_for, OutputFormat,
};
use devcrew_engine::secrets::scrub;
use devcrew_engine::telemetry::init_telemetry_with_level;
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match run(cli, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, format);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, format: OutputFormat) -> anyhow::Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    // Logging is installed once, so the level is settled before anything else runs
    init_telemetry_with_level(&log_level(cli.log.as_deref(), &config_path));

    tracing::debug!(
        "devcrew v{} ({} - {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let model = cli.model.as_deref();

    match cli.command {
        Command::Build { description } => {
            let config = load_config(&config_path, model)?;
            let description = description.join(" ");
            tracing::info!("Building: {}", description);
            handle_build(&description, &config, format).await
        }

        Command::Chat { agent, message } => {
            let config = load_config(&config_path, model)?;
            handle_chat(&agent, &message.join(" "), &config, format).await
        }

        Command::Agents => handle_agents(format),

        Command::Init => handle_init(&config_path, format),

        Command::Config { action } => {
            tracing::debug!("Config management: {:?}", action);
            match action {
                ConfigAction::Show => {
                    let config = load_config(&config_path, model)?;
                    handle_config_show(&config, &config_path, format)
                }
                ConfigAction::SetKey { key } => handle_config_set_key(&key, format),
                ConfigAction::SetModel { model } => {
                    handle_config_set_model(&config_path, &model, format)
                }
                ConfigAction::Validate => handle_config_validate(&config_path, format),
            }
        }
    }
}

/// `--log` wins, then the config file, then "info"
fn log_level(flag: Option<&str>, config_path: &Path) -> String {
    flag.map(str::to_string)
        .or_else(|| {
            Config::load_from_path(config_path)
                .ok()
                .map(|config| config.core.log_level)
        })
        .unwrap_or_else(|| "info".to_string())
}

fn load_config(config_path: &Path, model: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::load_or_create_at(config_path)?;
    if let Some(model) = model {
        config.apply_model_override(model)?;
    }
    Ok(config)
}

fn report_error(error: &anyhow::Error, format: OutputFormat) {
    let message = scrub(&format!("{:#}", error));
    let hint = hint_for(error);
    tracing::debug!("Command failed: {}", message);

    match format {
        OutputFormat::Text => {
            eprintln!("{} {}", "❌ Error:".red().bold(), message);
            if let Some(hint) = hint {
                eprintln!("{} {}", "💡".yellow(), hint);
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "status": "failed",
                "error": message,
                "hint": hint,
            });
            println!("{}", output);
        }
    }
}
