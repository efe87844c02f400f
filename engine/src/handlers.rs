//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - build: Plan and generate a project
//! - chat: Ask one agent a question
//! - agents: List the specialists
//! - init: Write the default configuration
//! - config: Show, validate and edit configuration

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use crate::agents::{profile, AgentRegistry};
use crate::conductor::{BuildError, BuildOrchestrator, JsonReporter, ProgressSink, TerminalReporter};
use crate::config::Config;
use crate::llm::groq::{GroqProvider, SUPPORTED_MODELS};
use crate::secrets::{mask_key, SecretManager, GROQ_KEY_NAME, SERVICE_NAME};
use crate::tools::ProjectWriter;
use sdk::errors::{EngineError, ErrorHint};
use sdk::types::Role;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Registry of Groq-backed agents. Fails early when no API key is available.
fn build_registry(config: &Config) -> Result<AgentRegistry> {
    let api_key = SecretManager::new(SERVICE_NAME).groq_api_key()?;
    let provider = GroqProvider::new(&config.llm, api_key).context("Failed to create Groq client")?;
    Ok(AgentRegistry::from_config(config, Arc::new(provider)))
}

/// Generate a project from a description
pub async fn handle_build(description: &str, config: &Config, format: OutputFormat) -> Result<()> {
    let registry = build_registry(config)?;
    let writer = ProjectWriter::new(config.output_dir()?);

    let progress: Arc<dyn ProgressSink> = match format {
        OutputFormat::Text => Arc::new(TerminalReporter),
        OutputFormat::Json => Arc::new(JsonReporter),
    };

    let orchestrator = BuildOrchestrator::new(registry, writer, progress);
    orchestrator.execute_build(description).await?;

    Ok(())
}

/// Send one message to the agent matching `agent_name`
pub async fn handle_chat(
    agent_name: &str,
    message: &str,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let registry = build_registry(config)?;
    let agent = registry
        .by_name(agent_name)
        .with_context(|| format!("Available agents: {}", registry.names().join(", ")))?;
    let agent_profile = agent.profile();

    if format == OutputFormat::Text {
        println!(
            "{} {} is thinking...",
            agent_profile.icon,
            agent_profile.name.color(agent_profile.color).bold()
        );
    }

    let response = agent
        .process("", message)
        .await
        .with_context(|| format!("{} agent request failed", agent_profile.name))?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", response.content);
            println!();
            println!(
                "{}",
                format!("📊 Model: {} • Tokens: {}", response.model, response.tokens_used)
                    .dimmed()
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "agent": agent_profile.role,
                "content": response.content,
                "model": response.model,
                "tokens_used": response.tokens_used,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// List the built-in specialists
pub fn handle_agents(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", "Available agents:".bold());
            println!();
            for role in Role::ALL {
                let p = profile(role);
                println!(
                    "  {} {}",
                    p.icon,
                    format!("@{}", role).color(p.color).bold()
                );
                println!("     {}", p.description.bright_black());
            }
            println!();
            println!("Usage: devcrew chat @<agent> <message>");
        }
        OutputFormat::Json => {
            let agents: Vec<_> = Role::ALL
                .iter()
                .map(|role| {
                    let p = profile(*role);
                    json!({
                        "name": role,
                        "icon": p.icon,
                        "description": p.description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "agents": agents }))?);
        }
    }
    Ok(())
}

/// Write the default configuration if none exists
pub fn handle_init(config_path: &Path, format: OutputFormat) -> Result<()> {
    let created = if config_path.exists() {
        false
    } else {
        Config::create_default(config_path)?;
        true
    };

    match format {
        OutputFormat::Text => {
            if created {
                println!("✓ Created configuration at {}", config_path.display());
            } else {
                println!("Configuration already exists at {}", config_path.display());
            }
            println!();
            println!("Next steps:");
            println!("  1. Get an API key from https://console.groq.com/keys");
            println!("  2. devcrew config set-key <KEY>   (or export GROQ_API_KEY)");
            println!("  3. devcrew build \"a todo app with user accounts\"");
        }
        OutputFormat::Json => {
            let output = json!({
                "path": config_path,
                "created": created,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Display-safe view of the configuration and key status
pub fn config_view(config: &Config, config_path: &Path, masked_key: Option<String>) -> serde_json::Value {
    let agents: serde_json::Map<String, serde_json::Value> = Role::ALL
        .iter()
        .map(|role| {
            let settings = config.agent_settings(*role);
            (
                role.to_string(),
                json!({
                    "model": settings.model,
                    "temperature": settings.temperature,
                    "max_tokens": settings.max_tokens,
                }),
            )
        })
        .collect();

    json!({
        "config_path": config_path,
        "log_level": config.core.log_level,
        "output_dir": config.core.output_dir,
        "base_url": config.llm.base_url,
        "default_model": config.llm.default_model,
        "timeout_secs": config.llm.timeout_secs,
        "api_key": masked_key,
        "agents": agents,
    })
}

/// Show the effective configuration with the API key masked
pub fn handle_config_show(config: &Config, config_path: &Path, format: OutputFormat) -> Result<()> {
    let masked = SecretManager::new(SERVICE_NAME)
        .groq_api_key()
        .ok()
        .map(|key| key.masked());

    match format {
        OutputFormat::Text => {
            println!("{}", "Configuration".bold());
            println!("  File:          {}", config_path.display());
            println!("  Log level:     {}", config.core.log_level);
            println!("  Output dir:    {}", config.core.output_dir.display());
            println!("  Endpoint:      {}", config.llm.base_url);
            println!("  Default model: {}", config.llm.default_model);
            println!("  Timeout:       {}s", config.llm.timeout_secs);
            match &masked {
                Some(key) => println!("  API key:       {}", key),
                None => println!("  API key:       {}", "not set".yellow()),
            }
            println!();
            println!("{}", "Agents".bold());
            for role in Role::ALL {
                let settings = config.agent_settings(role);
                println!(
                    "  {:<9} {} (temperature {}, max tokens {})",
                    role.as_str(),
                    settings.model,
                    settings.temperature,
                    settings.max_tokens
                );
            }
        }
        OutputFormat::Json => {
            let output = config_view(config, config_path, masked);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Store the API key in the OS keychain
pub fn handle_config_set_key(key: &str, format: OutputFormat) -> Result<()> {
    let key = key.trim();
    SecretManager::new(SERVICE_NAME)
        .set_secret(GROQ_KEY_NAME, key)
        .context("Failed to store API key")?;

    match format {
        OutputFormat::Text => println!("✓ API key stored ({})", mask_key(key)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "stored": true, "api_key": mask_key(key) }))?
        ),
    }
    Ok(())
}

/// Persist a new default model
pub fn handle_config_set_model(config_path: &Path, model: &str, format: OutputFormat) -> Result<()> {
    let mut config = Config::load_or_create_at(config_path)?;
    if let Err(e) = config.set_default_model(model) {
        if format == OutputFormat::Text {
            println!("Supported models:");
            for m in SUPPORTED_MODELS {
                println!("  {}", m);
            }
        }
        return Err(e.into());
    }
    config.save(config_path)?;

    match format {
        OutputFormat::Text => println!("✓ Default model set to {}", config.llm.default_model),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "default_model": config.llm.default_model }))?
        ),
    }
    Ok(())
}

/// Re-read and validate the configuration file
pub fn handle_config_validate(config_path: &Path, format: OutputFormat) -> Result<()> {
    let result = Config::load_from_path(config_path);

    match format {
        OutputFormat::Text => match &result {
            Ok(_) => println!("✓ Configuration is valid: {}", config_path.display()),
            Err(e) => println!("✗ {}", e),
        },
        OutputFormat::Json => {
            let output = json!({
                "path": config_path,
                "valid": result.is_ok(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    result.map(|_| ()).map_err(Into::into)
}

/// User hint for any typed error carried by an `anyhow::Error`
pub fn hint_for(error: &anyhow::Error) -> Option<&str> {
    if let Some(e) = error.downcast_ref::<BuildError>() {
        return Some(e.user_hint());
    }
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .map(|e| e.user_hint())
}
