use reqwest::{Client, Url};

use crate::config::ClientConfig;
use crate::error::{CryptogramError, Result};

/// Form field the server reads the public key from.
pub const PUBKEY_FIELD: &str = "pubkey";

/// Sends a public key to the cryptogram endpoint and returns the raw reply.
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    http: Client,
    endpoint: Url,
}

impl ExchangeClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            CryptogramError::Config(format!("invalid endpoint {:?}: {}", config.endpoint, e))
        })?;
        if config.request_timeout_secs == 0 {
            return Err(CryptogramError::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CryptogramError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST `public_key` as the `pubkey` form field; the text body is the
    /// cryptogram. Any non-success status is a network error. The body is
    /// not inspected, so a malformed one surfaces later as a decryption error.
    pub async fn request_cryptogram(&self, public_key: &str) -> Result<String> {
        if public_key.trim().is_empty() {
            return Err(CryptogramError::InvalidPublicKey(
                "refusing to send an empty public key".to_string(),
            ));
        }

        tracing::info!(endpoint = %self.endpoint, "requesting cryptogram");
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[(PUBKEY_FIELD, public_key)])
            .send()
            .await?
            .error_for_status()?;

        let cryptogram = response.text().await?;
        tracing::debug!(bytes = cryptogram.len(), "received cryptogram");
        Ok(cryptogram)
    }
}
