//! Tailscale key API client
//!
//! Two calls: exchange the OAuth client credentials for an access token,
//! then create a tagged auth key under that token.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MintConfig;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateKeyRequest {
    capabilities: Capabilities,
    expiry_seconds: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
}

#[derive(Debug, Serialize)]
struct Capabilities {
    devices: DeviceCaps,
}

#[derive(Debug, Serialize)]
struct DeviceCaps {
    create: CreateCaps,
}

#[derive(Debug, Serialize)]
struct CreateCaps {
    reusable: bool,
    ephemeral: bool,
    preauthorized: bool,
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: String,
}

/// Mints tagged auth keys against one tailnet.
pub struct KeyMinter {
    http: Client,
    config: MintConfig,
}

impl KeyMinter {
    pub fn new(config: MintConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Mint one auth key carrying `tag`. The key description is the target
    /// hostname when given, so minted keys are traceable in the admin panel.
    pub async fn mint(&self, tag: &str, hostname: &str) -> Result<String> {
        let access_token = self.access_token().await?;
        debug!("access token obtained");

        let description = if hostname.is_empty() {
            "minted-by-quadlet-fleet".to_string()
        } else {
            hostname.to_string()
        };

        let request = CreateKeyRequest {
            capabilities: Capabilities {
                devices: DeviceCaps {
                    create: CreateCaps {
                        reusable: self.config.reusable,
                        ephemeral: self.config.ephemeral,
                        preauthorized: self.config.preauthorized,
                        tags: vec![tag.to_string()],
                    },
                },
            },
            expiry_seconds: self.config.expiry_seconds,
            description,
        };

        let url = format!(
            "{}/api/v2/tailnet/{}/keys",
            self.config.api_base_url, self.config.tailnet
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Api {
                endpoint: "create key API",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let key: KeyResponse = response.json().await?;
        if key.key.is_empty() {
            return Err(Error::EmptyField {
                endpoint: "create key API",
                field: "key",
            });
        }
        Ok(key.key)
    }

    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/api/v2/oauth/token", self.config.api_base_url);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Api {
                endpoint: "OAuth token API",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(Error::EmptyField {
                endpoint: "OAuth token API",
                field: "access_token",
            });
        }
        Ok(token.access_token)
    }
}
