//! Shared role and response types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Specialist role a task can be dispatched to
///
/// The set is closed. Plan lines naming anything else are dropped by the
/// plan parser rather than failing the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Planner,
    Frontend,
    Backend,
    Security,
}

impl Role {
    /// All roles in display order
    pub const ALL: [Role; 4] = [Role::Planner, Role::Frontend, Role::Backend, Role::Security];

    /// Map a plan token such as `BACKEND` or `backend` to a role
    pub fn from_token(token: &str) -> Option<Role> {
        match token.to_ascii_lowercase().as_str() {
            "planner" => Some(Role::Planner),
            "frontend" => Some(Role::Frontend),
            "backend" => Some(Role::Backend),
            "security" => Some(Role::Security),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Planner => "planner",
            Role::Frontend => "frontend",
            Role::Backend => "backend",
            Role::Security => "security",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response payload produced by a specialist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    pub tokens_used: u32,
    pub model: String,
}

impl AgentResponse {
    pub fn new(content: impl Into<String>, tokens_used: u32, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tokens_used,
            model: model.into(),
        }
    }
}
