use base64::{Engine as _, engine::general_purpose::STANDARD};
use openssl::pkey::{Private, Public};
use openssl::rsa::{Padding, Rsa};
use std::fmt;

use crate::error::{CryptogramError, Result};

/// Modulus sizes the demo agrees to generate. 1024 is kept for the classic
/// browser demo only; it is not secure for new systems.
pub const SUPPORTED_KEY_SIZES: [u32; 4] = [1024, 2048, 3072, 4096];

// PKCS#1 v1.5 encryption padding costs 11 bytes of every block
const PKCS1_OVERHEAD: usize = 11;

/// PEM-encoded halves of one generated keypair.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    /// SubjectPublicKeyInfo PEM, sent to the server.
    pub public_key: String,
    /// PKCS#1 PEM, never leaves the process.
    pub private_key: String,
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

struct HeldKey {
    rsa: Rsa<Private>,
    pem: Keypair,
}

/// Owns the current keypair for the lifetime of a session.
#[derive(Default)]
pub struct KeyManager {
    current: Option<HeldKey>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh keypair, replacing whatever was held before.
    pub fn generate_keypair(&mut self, key_size_bits: u32) -> Result<Keypair> {
        if !SUPPORTED_KEY_SIZES.contains(&key_size_bits) {
            return Err(CryptogramError::KeyGeneration(format!(
                "unsupported key size {} (supported: {:?})",
                key_size_bits, SUPPORTED_KEY_SIZES
            )));
        }

        let rsa = Rsa::generate(key_size_bits).map_err(keygen_error)?;
        let private_key = pem_string(rsa.private_key_to_pem().map_err(keygen_error)?)?;
        let public_key = pem_string(rsa.public_key_to_pem().map_err(keygen_error)?)?;

        let pem = Keypair {
            public_key,
            private_key,
        };
        tracing::info!(bits = key_size_bits, "generated RSA keypair");

        self.current = Some(HeldKey {
            rsa,
            pem: pem.clone(),
        });
        Ok(pem)
    }

    /// The keypair currently held, if one has been generated.
    pub fn keypair(&self) -> Option<&Keypair> {
        self.current.as_ref().map(|held| &held.pem)
    }

    /// Decrypt a base64 PKCS#1 v1.5 cryptogram with the held private key.
    pub fn decrypt(&self, cryptogram: &str) -> Result<String> {
        let held = self.current.as_ref().ok_or_else(|| {
            CryptogramError::Decryption("no private key has been generated".to_string())
        })?;

        let encrypted = STANDARD
            .decode(cryptogram.trim())
            .map_err(|e| CryptogramError::Decryption(format!("invalid base64: {}", e)))?;

        // OpenSSL 3.2+ answers bad PKCS#1 padding with a synthetic plaintext
        // (implicit rejection), so the block is unpadded here instead.
        let rsa = &held.rsa;
        let mut block = vec![0; rsa.size() as usize];
        let block_len = rsa
            .private_decrypt(&encrypted, &mut block, Padding::NONE)
            .map_err(|e| CryptogramError::Decryption(e.to_string()))?;
        block.truncate(block_len);

        let message = strip_pkcs1_type2(&block)?;
        tracing::debug!(bytes = message.len(), "decrypted cryptogram");
        String::from_utf8(message.to_vec())
            .map_err(|_| CryptogramError::Decryption("plaintext is not valid UTF-8".to_string()))
    }
}

/// Largest plaintext, in bytes, a modulus of `key_size_bits` can carry.
pub fn max_message_len(key_size_bits: u32) -> usize {
    (key_size_bits as usize / 8).saturating_sub(PKCS1_OVERHEAD)
}

/// Encrypt `plaintext` for the holder of `public_pem`, producing the base64
/// cryptogram that [`KeyManager::decrypt`] accepts. Both SPKI and PKCS#1
/// public PEMs are understood.
pub fn encrypt_for(public_pem: &str, plaintext: &str) -> Result<String> {
    let rsa = parse_public_key(public_pem)?;
    let data = plaintext.as_bytes();

    let max = max_message_len(rsa.size() * 8);
    if data.len() > max {
        return Err(CryptogramError::TooLarge(data.len(), max));
    }

    let mut buf = vec![0; rsa.size() as usize];
    let encrypted_len = rsa
        .public_encrypt(data, &mut buf, Padding::PKCS1)
        .map_err(|e| CryptogramError::Encryption(e.to_string()))?;
    buf.truncate(encrypted_len);

    Ok(STANDARD.encode(&buf))
}

/// EME-PKCS1-v1_5 decoding: `00 02 PS 00 M` with at least 8 nonzero PS bytes.
fn strip_pkcs1_type2(block: &[u8]) -> Result<&[u8]> {
    let bad_padding = || CryptogramError::Decryption("invalid PKCS#1 padding".to_string());

    if block.len() < PKCS1_OVERHEAD || block[0] != 0x00 || block[1] != 0x02 {
        return Err(bad_padding());
    }
    let separator = block[2..]
        .iter()
        .position(|&b| b == 0x00)
        .ok_or_else(bad_padding)?;
    if separator < 8 {
        return Err(bad_padding());
    }
    Ok(&block[2 + separator + 1..])
}

fn parse_public_key(public_pem: &str) -> Result<Rsa<Public>> {
    let pem = public_pem.trim().as_bytes();
    if pem.is_empty() {
        return Err(CryptogramError::InvalidPublicKey("empty PEM".to_string()));
    }
    Rsa::public_key_from_pem(pem)
        .or_else(|_| Rsa::public_key_from_pem_pkcs1(pem))
        .map_err(|e| CryptogramError::InvalidPublicKey(e.to_string()))
}

fn pem_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| CryptogramError::KeyGeneration("PEM output is not UTF-8".to_string()))
}

fn keygen_error(e: openssl::error::ErrorStack) -> CryptogramError {
    CryptogramError::KeyGeneration(e.to_string())
}
