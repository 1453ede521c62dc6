//! Credential configuration
//!
//! Loaded from a root-owned env file (default `/etc/tailscale/oauth.env`)
//! holding the OAuth client credentials and optional key parameters.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.tailscale.com";
const DEFAULT_EXPIRY_SECONDS: u32 = 3600;

/// OAuth client credentials plus the parameters of the keys to mint.
#[derive(Debug, Clone)]
pub struct MintConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Tailnet the key belongs to; `-` selects the client's own tailnet.
    pub tailnet: String,
    pub expiry_seconds: u32,
    pub ephemeral: bool,
    pub reusable: bool,
    pub preauthorized: bool,
    /// Base URL of both the OAuth and the key endpoint.
    pub api_base_url: String,
}

impl MintConfig {
    /// Load credentials from an env file.
    ///
    /// `TS_API_CLIENT_ID` and `TS_API_CLIENT_SECRET` are required. The
    /// tailnet defaults to `-`, expiry to one hour, and minted keys are
    /// ephemeral, single-use, preauthorized unless the file says otherwise.
    /// A malformed `TS_KEY_EXPIRY_SECONDS` keeps the default.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::CredentialsRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let env = parse_env_file(&text);

        let require = |name: &str| -> Result<String> {
            match env.get(name) {
                Some(v) if !v.is_empty() => Ok(v.clone()),
                _ => Err(Error::MissingCredential {
                    name: name.to_string(),
                    path: path.display().to_string(),
                }),
            }
        };

        let mut config = Self {
            client_id: require("TS_API_CLIENT_ID")?,
            client_secret: require("TS_API_CLIENT_SECRET")?,
            tailnet: env
                .get("TS_TAILNET")
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| "-".to_string()),
            expiry_seconds: DEFAULT_EXPIRY_SECONDS,
            ephemeral: true,
            reusable: false,
            preauthorized: true,
            api_base_url: DEFAULT_API_BASE.to_string(),
        };

        if let Some(v) = env.get("TS_KEY_EXPIRY_SECONDS") {
            if let Ok(n) = v.parse() {
                config.expiry_seconds = n;
            }
        }
        if let Some(v) = env.get("TS_KEY_EPHEMERAL") {
            config.ephemeral = v == "true";
        }
        if let Some(v) = env.get("TS_KEY_REUSABLE") {
            config.reusable = v == "true";
        }
        if let Some(v) = env.get("TS_KEY_PREAUTHORIZED") {
            config.preauthorized = v == "true";
        }

        Ok(config)
    }
}

/// Parse `KEY=VALUE` lines; blanks and `#` comments are skipped, both sides
/// are trimmed, a line without `=` is ignored.
fn parse_env_file(text: &str) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            env.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    env
}
