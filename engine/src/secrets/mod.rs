pub mod string;

pub use string::SecretString;

use keyring::Entry;
use regex::Regex;
use sdk::errors::EngineError;
use std::sync::OnceLock;

/// Keychain service all devcrew secrets are stored under
pub const SERVICE_NAME: &str = "devcrew";

/// Keychain entry holding the Groq API key
pub const GROQ_KEY_NAME: &str = "groq_api_key";

/// Environment variable consulted before the keychain
pub const GROQ_ENV_VAR: &str = "GROQ_API_KEY";

/// SecretManager handles storage and retrieval of secrets using the OS keychain.
///
/// Secrets are stored in:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
///
/// Lookups never prompt. A missing API key is reported as
/// `EngineError::MissingApiKey` so the CLI can point at `config set-key`.
///
/// The SecretManager also scrubs secrets from text before it reaches logs.
pub struct SecretManager {
    service_name: String,
}

static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Patterns match:
/// - Groq API keys: gsk_[a-zA-Z0-9]{20,}
/// - OpenAI-style keys: sk-[a-zA-Z0-9]{20,}
/// - GitHub tokens: ghp_[a-zA-Z0-9]{36}
/// - Bearer tokens: Bearer\s+[^\s]{20,}
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"gsk_[a-zA-Z0-9]{20,}",
            r"sk-[a-zA-Z0-9\-_]{20,}",
            r"ghp_[a-zA-Z0-9]{36}",
            r"Bearer\s+[^\s]{20,}",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

impl SecretManager {
    /// Creates a new SecretManager with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, EngineError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            EngineError::KeyringError(format!("Failed to create keyring entry: {}", e))
        })
    }

    /// Retrieves a secret from the OS keychain.
    ///
    /// Returns `Ok(None)` when no entry exists.
    ///
    /// # Errors
    /// Returns `EngineError::KeyringError` if keychain access fails
    pub fn get_secret(&self, key: &str) -> Result<Option<String>, EngineError> {
        match self.entry(key)?.get_password() {
            Ok(secret) => {
                tracing::debug!("Retrieved secret '{}' from keychain", key);
                Ok(Some(secret))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(EngineError::KeyringError(format!(
                "Failed to retrieve secret '{}': {}",
                key, e
            ))),
        }
    }

    /// Stores a secret in the OS keychain, replacing any previous value.
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), EngineError> {
        if value.trim().is_empty() {
            return Err(EngineError::KeyringError(
                "Secret cannot be empty".to_string(),
            ));
        }

        self.entry(key)?.set_password(value).map_err(|e| {
            EngineError::KeyringError(format!("Failed to store secret '{}': {}", key, e))
        })?;

        tracing::info!("Stored secret '{}' in keychain", key);
        Ok(())
    }

    /// Deletes a secret from the OS keychain.
    pub fn delete_secret(&self, key: &str) -> Result<(), EngineError> {
        self.entry(key)?.delete_password().map_err(|e| {
            EngineError::KeyringError(format!("Failed to delete secret '{}': {}", key, e))
        })?;

        tracing::info!("Deleted secret '{}' from keychain", key);
        Ok(())
    }

    /// Checks if a secret exists in the OS keychain.
    pub fn has_secret(&self, key: &str) -> bool {
        matches!(self.get_secret(key), Ok(Some(_)))
    }

    /// Resolves the Groq API key.
    ///
    /// Lookup order: `GROQ_API_KEY` environment variable, then the keychain.
    pub fn groq_api_key(&self) -> Result<SecretString, EngineError> {
        self.resolve_api_key(std::env::var(GROQ_ENV_VAR).ok())
    }

    /// Resolves the API key given an already-read environment value.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Result<SecretString, EngineError> {
        if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Using API key from {}", GROQ_ENV_VAR);
            return Ok(SecretString::new(value.trim()));
        }

        match self.get_secret(GROQ_KEY_NAME) {
            Ok(Some(value)) if !value.trim().is_empty() => Ok(SecretString::new(value)),
            Ok(_) => Err(EngineError::MissingApiKey),
            Err(e) => {
                // An unusable keychain is the same as no key for the caller
                tracing::warn!("Keychain lookup failed: {}", e);
                Err(EngineError::MissingApiKey)
            }
        }
    }

    /// Scrubs secrets from text by replacing them with [REDACTED].
    ///
    /// # Examples
    /// ```
    /// use devcrew_engine::secrets::SecretManager;
    ///
    /// let manager = SecretManager::new("test");
    /// let scrubbed = manager.scrub("key gsk_1234567890abcdefghijKLMN rejected");
    /// assert_eq!(scrubbed, "key [REDACTED] rejected");
    /// ```
    pub fn scrub(&self, text: &str) -> String {
        scrub(text)
    }
}

/// Free-standing scrubber used where no manager is at hand.
pub fn scrub(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in get_secret_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }
    result
}

/// Masks a key for display: first 4 and last 4 characters kept.
///
/// Keys of 8 characters or fewer are fully masked.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
