use crate::config::ClientConfig;
use crate::error::{CryptogramError, Result};
use crate::exchange_client::ExchangeClient;
use crate::key_manager::{KeyManager, Keypair};
use crate::view::{Region, Trigger, View};

/// Where the page is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    KeyGenerated,
    Exchanged,
}

/// Everything one page load owns: the keypair, the exchange client, the
/// rendered view and the last cryptogram.
///
/// Both triggers take `&mut self`, so an exchange cannot be started while
/// another is awaiting its response; the view sees the generate trigger
/// disabled for that window.
pub struct Session<V: View> {
    config: ClientConfig,
    keys: KeyManager,
    client: ExchangeClient,
    view: V,
    state: SessionState,
    cryptogram: Option<String>,
}

impl<V: View> Session<V> {
    pub fn new(config: ClientConfig, view: V) -> Result<Self> {
        let client = ExchangeClient::new(&config)?;
        Ok(Self {
            config,
            keys: KeyManager::new(),
            client,
            view,
            state: SessionState::Idle,
            cryptogram: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn keypair(&self) -> Option<&Keypair> {
        self.keys.keypair()
    }

    /// The last cryptogram that decrypted successfully.
    pub fn cryptogram(&self) -> Option<&str> {
        self.cryptogram.as_deref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Page load: a fresh key, then one exchange.
    pub async fn load(&mut self) -> Result<String> {
        self.new_key()?;
        self.generate().await
    }

    /// The "new key" trigger. Failure here is fatal for the session.
    pub fn new_key(&mut self) -> Result<()> {
        let keypair = match self.keys.generate_keypair(self.config.key_size_bits) {
            Ok(keypair) => keypair,
            Err(e) => {
                self.view.show_error(Some(&e.to_string()));
                return Err(e);
            }
        };

        self.view.replace(Region::PrivateKey, &keypair.private_key);
        self.view.replace(Region::PublicKey, &keypair.public_key);
        // the old cryptogram belongs to the replaced key
        self.view.replace(Region::Cryptogram, "");
        self.view.replace(Region::PlainText, "");
        self.view.show_error(None);

        self.cryptogram = None;
        self.state = SessionState::KeyGenerated;
        Ok(())
    }

    /// The "generate" trigger: exchange the public key for a cryptogram and
    /// decrypt it. On failure the error is shown and the previously rendered
    /// regions are left as they were.
    pub async fn generate(&mut self) -> Result<String> {
        let public_key = match self.keys.keypair() {
            Some(keypair) => keypair.public_key.clone(),
            None => {
                let e = CryptogramError::InvalidPublicKey(
                    "no keypair has been generated yet".to_string(),
                );
                self.view.show_error(Some(&e.to_string()));
                return Err(e);
            }
        };

        self.view.set_enabled(Trigger::Generate, false);
        let outcome = self.exchange(&public_key).await;
        self.view.set_enabled(Trigger::Generate, true);

        match outcome {
            Ok((cryptogram, plain)) => {
                self.view.replace(Region::Cryptogram, &cryptogram);
                self.view.replace(Region::PlainText, &plain);
                self.view.show_error(None);
                self.cryptogram = Some(cryptogram);
                self.state = SessionState::Exchanged;
                Ok(plain)
            }
            Err(e) => {
                tracing::warn!("exchange failed: {}", e);
                self.view.show_error(Some(&e.to_string()));
                self.state = SessionState::KeyGenerated;
                Err(e)
            }
        }
    }

    async fn exchange(&self, public_key: &str) -> Result<(String, String)> {
        let cryptogram = self.client.request_cryptogram(public_key).await?;
        let plain = self.keys.decrypt(&cryptogram)?;
        Ok((cryptogram, plain))
    }
}
