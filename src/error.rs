use thiserror::Error;

/// Every failure the demo can surface, client or stub server.
#[derive(Error, Debug)]
pub enum CryptogramError {
    /// Fatal: the demo cannot proceed without a keypair.
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(String),

    /// Recoverable only by the user retriggering the exchange.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Data too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CryptogramError>;

impl From<reqwest::Error> for CryptogramError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CryptogramError::Network(format!("request timed out: {}", err))
        } else if let Some(status) = err.status() {
            CryptogramError::Network(format!("server responded with {}", status))
        } else {
            CryptogramError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CryptogramError {
    fn from(err: serde_json::Error) -> Self {
        CryptogramError::Config(format!("JSON config error: {}", err))
    }
}

impl CryptogramError {
    /// True for the one error class that leaves the demo unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CryptogramError::KeyGeneration(_))
    }
}
