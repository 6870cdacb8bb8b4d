// This file allows the components to be used as a library as well
pub mod config;
pub mod error;
pub mod exchange_client;
pub mod handlers;
pub mod key_manager;
pub mod models;
pub mod server;
pub mod session;
pub mod view;

// Re-export important types for easier use
pub use config::{ClientConfig, ServerConfig};
pub use error::{CryptogramError, Result};
pub use exchange_client::ExchangeClient;
pub use key_manager::{KeyManager, Keypair, encrypt_for};
pub use session::{Session, SessionState};
pub use view::{MemoryView, Region, TerminalView, Trigger, View};

/// Install the fmt subscriber used by both binaries; `RUST_LOG` overrides
/// the default `info` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
