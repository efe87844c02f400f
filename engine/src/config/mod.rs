//! Configuration management
//!
//! This module handles loading, validation, and management of the devcrew configuration.
//! Configuration is stored in TOML format at ~/.devcrew/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level and the directory generated projects are written to
//! - **llm**: Groq endpoint, default model and request timeout
//! - **agents**: Per-role model, temperature and token limits
//!
//! The API key is never stored here. It lives in the OS keychain or in the
//! `GROQ_API_KEY` environment variable (see [`crate::secrets`]).
//!
//! # Examples
//!
//! ```no_run
//! use devcrew_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Output directory: {:?}", config.core.output_dir);
//! println!("Default model: {}", config.llm.default_model);
//! # Ok(())
//! # }
//! ```

use crate::llm::groq;
use sdk::errors::EngineError;
use sdk::types::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub llm: LLMConfig,

    /// Per-role settings keyed by role name (`planner`, `frontend`, ...)
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
}

/// Core settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Root of the generated project (relative to CWD unless absolute; supports ~)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Groq endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub default_model: String,

    /// HTTP deadline for one completion call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settings for one specialist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Overrides `llm.default_model` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Fully resolved settings handed to an agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated-project")
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AgentConfig {
    /// Built-in settings for a role
    pub fn for_role(role: Role) -> Self {
        let temperature = match role {
            Role::Planner => 0.7,
            Role::Frontend | Role::Backend => 0.3,
            Role::Security => 0.2,
        };

        Self {
            model: None,
            temperature,
            max_tokens: default_max_tokens(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.devcrew/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;
        Self::load_or_create_at(&config_path)
    }

    /// Same as [`Config::load_or_create`] for an explicit path (`--config`)
    pub fn load_or_create_at(path: &Path) -> Result<Self, EngineError> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Self::create_default(path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse, merge role defaults and validate
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    pub fn create_default(path: &Path) -> Result<Self, EngineError> {
        let mut config = Self::default_config();
        config.validate_and_process()?;
        config.save(path)?;

        tracing::info!("Created default configuration at {:?}", path);
        Ok(config)
    }

    /// Write the configuration as TOML, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    EngineError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))
    }

    /// Get the default configuration file path (~/.devcrew/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".devcrew").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        let agents = Role::ALL
            .iter()
            .map(|role| (role.as_str().to_string(), AgentConfig::for_role(*role)))
            .collect();

        Self {
            core: CoreConfig::default(),
            llm: LLMConfig::default(),
            agents,
        }
    }

    /// Resolved settings for one role
    pub fn agent_settings(&self, role: Role) -> AgentSettings {
        let agent = self
            .agents
            .get(role.as_str())
            .cloned()
            .unwrap_or_else(|| AgentConfig::for_role(role));

        AgentSettings {
            model: agent
                .model
                .unwrap_or_else(|| self.llm.default_model.clone()),
            temperature: agent.temperature,
            max_tokens: agent.max_tokens,
        }
    }

    /// Replace the default model and every per-role model for this invocation
    pub fn apply_model_override(&mut self, model: &str) -> Result<(), EngineError> {
        check_model(model, "--model")?;

        self.llm.default_model = model.to_string();
        for agent in self.agents.values_mut() {
            agent.model = Some(model.to_string());
        }
        Ok(())
    }

    /// Change the persisted default model
    pub fn set_default_model(&mut self, model: &str) -> Result<(), EngineError> {
        let model = model.trim();
        check_model(model, "llm.default_model")?;
        self.llm.default_model = model.to_string();
        Ok(())
    }

    /// Output directory with `~` expanded
    pub fn output_dir(&self) -> Result<PathBuf, EngineError> {
        expand_path(&self.core.output_dir)
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates log level, timeout and endpoint
    /// - Merges missing role tables from built-in defaults
    /// - Checks every configured model against the supported catalog
    pub fn validate_and_process(&mut self) -> Result<(), EngineError> {
        if !VALID_LOG_LEVELS.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if self.core.output_dir.as_os_str().is_empty() {
            return Err(EngineError::Config(
                "core.output_dir cannot be empty".to_string(),
            ));
        }

        if self.llm.base_url.trim().is_empty() {
            return Err(EngineError::Config("llm.base_url cannot be empty".to_string()));
        }

        if self.llm.timeout_secs == 0 {
            return Err(EngineError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        check_model(&self.llm.default_model, "llm.default_model")?;

        for (name, agent) in &self.agents {
            if Role::from_token(name).is_none() {
                return Err(EngineError::Config(format!(
                    "Unknown agent '{}' in [agents]",
                    name
                )));
            }

            if let Some(model) = &agent.model {
                check_model(model, &format!("agents.{}", name))?;
            }

            if !(0.0..=2.0).contains(&agent.temperature) {
                return Err(EngineError::Config(format!(
                    "agents.{}.temperature must be between 0.0 and 2.0",
                    name
                )));
            }

            if agent.max_tokens == 0 {
                return Err(EngineError::Config(format!(
                    "agents.{}.max_tokens must be greater than 0",
                    name
                )));
            }
        }

        // Role tables are keyed by lowercase name
        self.agents = std::mem::take(&mut self.agents)
            .into_iter()
            .map(|(name, agent)| (name.to_ascii_lowercase(), agent))
            .collect();

        for role in Role::ALL {
            self.agents
                .entry(role.as_str().to_string())
                .or_insert_with(|| AgentConfig::for_role(role));
        }

        Ok(())
    }
}

fn check_model(model: &str, scope: &str) -> Result<(), EngineError> {
    if model.trim().is_empty() {
        return Err(EngineError::Config(format!("{} cannot be empty", scope)));
    }

    if !groq::is_supported_model(model) {
        return Err(EngineError::InvalidModel {
            model: model.to_string(),
            scope: scope.to_string(),
        });
    }

    Ok(())
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
