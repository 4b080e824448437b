use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Proxy endpoint and optional credentials, in the `{server, username, password}`
/// shape most providers hand out
///
/// Only the browser layer looks inside; the fetch engine never does.
#[derive(Clone, Deserialize)]
pub struct ProxyCredentials {
    pub server: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyCredentials {
    /// Load credentials from a JSON file
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read proxy credentials from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid proxy credentials in {}", path.display()))
    }

    /// Username and password, if the proxy requires authentication
    #[must_use]
    pub fn auth(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        }
    }
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
