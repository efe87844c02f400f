use std::fmt;

/// API key wrapper that never prints its contents.
///
/// `Debug` and `Display` both render `[REDACTED]`. Call `unsecure()` only at
/// the point the raw value goes into an HTTP header.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn unsecure(&self) -> &str {
        &self.0
    }

    /// Masked form for `config show`
    pub fn masked(&self) -> String {
        super::mask_key(&self.0)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}
