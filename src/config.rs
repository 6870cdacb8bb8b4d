use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::env::VarError;
use std::path::Path;
use std::time::Duration;

use crate::error::{CryptogramError, Result};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_FILE_VAR: &str = "CRYPTOGRAM_CONFIG";

/// Settings for the client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where the public key is POSTed.
    pub endpoint: String,
    pub key_size_bits: u32,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/cryptogram".to_string(),
            key_size_bits: 2048,
            request_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load from `$CRYPTOGRAM_CONFIG` (if set) and apply env overrides.
    pub fn load() -> Result<Self> {
        let base = match config_file_path()? {
            Some(path) => FileConfig::from_json_file(path)?.client,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `CRYPTOGRAM_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("CRYPTOGRAM_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(bits) = lookup("CRYPTOGRAM_KEY_SIZE") {
            self.key_size_bits = parse_var("CRYPTOGRAM_KEY_SIZE", &bits)?;
        }
        if let Some(secs) = lookup("CRYPTOGRAM_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_var("CRYPTOGRAM_TIMEOUT_SECS", &secs)?;
        }
        Ok(self)
    }
}

/// Settings for the stub cryptogram server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// The plaintext every cryptogram carries.
    pub message: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            message: "hello world".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        let base = match config_file_path()? {
            Some(path) => FileConfig::from_json_file(path)?.server,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("CRYPTOGRAM_BIND") {
            self.bind_addr = parse_var("CRYPTOGRAM_BIND", &addr)?;
        }
        if let Some(message) = lookup("CRYPTOGRAM_MESSAGE") {
            self.message = message;
        }
        Ok(self)
    }
}

/// Shape of the JSON config file; both sections are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub client: ClientConfig,
    pub server: ServerConfig,
}

impl FileConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn config_file_path() -> Result<Option<String>> {
    config_path_from(std::env::var(CONFIG_FILE_VAR))
}

/// An unset variable means no file; a set but unreadable one is an error.
fn config_path_from(var: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match var {
        Ok(path) => Ok(Some(path)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(CryptogramError::Config(format!(
            "{} is not valid UTF-8: {:?}",
            CONFIG_FILE_VAR, raw
        ))),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CryptogramError::Config(format!("{} has invalid value {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_prefer_2048_bit_keys() {
        let config = ClientConfig::default();
        assert_eq!(config.key_size_bits, 2048);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_client_settings() {
        let config = ClientConfig::default()
            .with_overrides(env(&[
                ("CRYPTOGRAM_ENDPOINT", "http://example.test/c"),
                ("CRYPTOGRAM_KEY_SIZE", "1024"),
                ("CRYPTOGRAM_TIMEOUT_SECS", " 3 "),
            ]))
            .unwrap();
        assert_eq!(config.endpoint, "http://example.test/c");
        assert_eq!(config.key_size_bits, 1024);
        assert_eq!(config.request_timeout_secs, 3);
    }

    #[test]
    fn bad_env_value_is_config_error() {
        let err = ClientConfig::default()
            .with_overrides(env(&[("CRYPTOGRAM_KEY_SIZE", "big")]))
            .unwrap_err();
        assert!(matches!(err, CryptogramError::Config(_)));

        let err = ServerConfig::default()
            .with_overrides(env(&[("CRYPTOGRAM_BIND", "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, CryptogramError::Config(_)));
    }

    #[test]
    fn config_path_var_states() {
        assert_eq!(config_path_from(Err(VarError::NotPresent)).unwrap(), None);
        assert_eq!(
            config_path_from(Ok("demo.json".to_string())).unwrap(),
            Some("demo.json".to_string())
        );
        let raw = std::ffi::OsString::from("not-really-utf8");
        assert!(matches!(
            config_path_from(Err(VarError::NotUnicode(raw))),
            Err(CryptogramError::Config(_))
        ));
    }

    #[test]
    fn json_file_sections_are_partial() {
        let file = FileConfig::from_json(
            r#"{ "client": { "key_size_bits": 4096 }, "server": { "message": "hi" } }"#,
        )
        .unwrap();
        assert_eq!(file.client.key_size_bits, 4096);
        assert_eq!(file.client.endpoint, ClientConfig::default().endpoint);
        assert_eq!(file.server.message, "hi");
        assert_eq!(file.server.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            FileConfig::from_json("{ nope"),
            Err(CryptogramError::Config(_))
        ));
    }
}
