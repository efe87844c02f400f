//! Agent directory
//!
//! Maps a [`Role`] to a specialist able to answer `(context, request)`.
//! Production specialists are [`Agent`]s backed by an [`LLMProvider`]; tests
//! register their own [`Specialist`] implementations.

pub mod prompts;

use crate::config::{AgentSettings, Config};
use crate::llm::{CompletionRequest, LLMError, LLMProvider, Message};
use async_trait::async_trait;
use colored::Color;
use sdk::errors::EngineError;
use sdk::types::{AgentResponse, Role};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Static description of a specialist
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub role: Role,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub color: Color,
    pub system_prompt: &'static str,
}

static PROFILES: [AgentProfile; 4] = [
    AgentProfile {
        role: Role::Planner,
        name: "Planner",
        icon: "🎯",
        description: "Project planning, task breakdown, architecture decisions",
        color: Color::Blue,
        system_prompt: prompts::PLANNER,
    },
    AgentProfile {
        role: Role::Frontend,
        name: "Frontend",
        icon: "🎨",
        description: "React, Vue, Angular, HTML/CSS, UI/UX decisions",
        color: Color::Magenta,
        system_prompt: prompts::FRONTEND,
    },
    AgentProfile {
        role: Role::Backend,
        name: "Backend",
        icon: "⚡",
        description: "APIs, databases, server logic, microservices",
        color: Color::Green,
        system_prompt: prompts::BACKEND,
    },
    AgentProfile {
        role: Role::Security,
        name: "Security",
        icon: "🛡️",
        description: "Security audits, vulnerability assessment, secure coding practices",
        color: Color::BrightRed,
        system_prompt: prompts::SECURITY,
    },
];

/// Built-in profile for a role
pub fn profile(role: Role) -> &'static AgentProfile {
    match role {
        Role::Planner => &PROFILES[0],
        Role::Frontend => &PROFILES[1],
        Role::Backend => &PROFILES[2],
        Role::Security => &PROFILES[3],
    }
}

/// Prompt assembly shared by every specialist.
///
/// An empty context leaves the request untouched.
pub fn assemble_prompt(context: &str, request: &str) -> String {
    if context.is_empty() {
        request.to_string()
    } else {
        format!("Context: {}\n\nUser Request: {}", context, request)
    }
}

/// Anything that can answer a request on behalf of a role
#[async_trait]
pub trait Specialist: Send + Sync {
    fn profile(&self) -> &AgentProfile;

    async fn process(&self, context: &str, request: &str) -> Result<AgentResponse, LLMError>;
}

/// Specialist backed by a chat-completion provider
pub struct Agent {
    profile: &'static AgentProfile,
    settings: AgentSettings,
    provider: Arc<dyn LLMProvider>,
}

impl Agent {
    pub fn new(role: Role, settings: AgentSettings, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            profile: profile(role),
            settings,
            provider,
        }
    }

    fn request(&self, context: &str, request: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                Message::system(self.profile.system_prompt),
                Message::user(assemble_prompt(context, request)),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

#[async_trait]
impl Specialist for Agent {
    fn profile(&self) -> &AgentProfile {
        self.profile
    }

    async fn process(&self, context: &str, request: &str) -> Result<AgentResponse, LLMError> {
        let completion = self.request(context, request);
        tracing::debug!(
            role = %self.profile.role,
            model = %completion.model,
            prompt_chars = completion.messages[1].content.chars().count(),
            "Sending request to {}",
            self.provider.name()
        );

        self.provider.complete(&completion).await
    }
}

/// Role-keyed directory of specialists
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: BTreeMap<Role, Arc<dyn Specialist>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one provider-backed agent per role
    pub fn from_config(config: &Config, provider: Arc<dyn LLMProvider>) -> Self {
        let mut registry = Self::new();
        for role in Role::ALL {
            let agent = Agent::new(role, config.agent_settings(role), Arc::clone(&provider));
            registry.register(Arc::new(agent));
        }
        registry
    }

    /// Add or replace the specialist for its role
    pub fn register(&mut self, specialist: Arc<dyn Specialist>) {
        self.agents.insert(specialist.profile().role, specialist);
    }

    pub fn resolve(&self, role: Role) -> Result<Arc<dyn Specialist>, EngineError> {
        self.agents
            .get(&role)
            .cloned()
            .ok_or_else(|| EngineError::AgentNotFound(role.to_string()))
    }

    /// Look up by display name: exact, then prefix, then substring.
    ///
    /// Case-insensitive; a leading `@` is ignored.
    pub fn by_name(&self, name: &str) -> Result<Arc<dyn Specialist>, EngineError> {
        let wanted = name.trim().trim_start_matches('@').to_lowercase();
        if wanted.is_empty() {
            return Err(EngineError::NoAgentMatching(name.to_string()));
        }

        let lowered = |s: &Arc<dyn Specialist>| s.profile().name.to_lowercase();

        let found = self
            .agents
            .values()
            .find(|s| lowered(*s) == wanted)
            .or_else(|| self.agents.values().find(|s| lowered(*s).starts_with(&wanted)))
            .or_else(|| self.agents.values().find(|s| lowered(*s).contains(&wanted)));

        found
            .cloned()
            .ok_or_else(|| EngineError::NoAgentMatching(wanted))
    }

    /// Lowercase names for completion and help output
    pub fn names(&self) -> Vec<String> {
        self.agents
            .values()
            .map(|s| s.profile().name.to_lowercase())
            .collect()
    }
}
