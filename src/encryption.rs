//! Tenant token encryption with historical-key rotation
//!
//! Integration tokens are stored encrypted with AES-256-GCM under a key
//! derived from a tenant secret. Secrets rotate over time, so the cipher
//! holds a prioritized list of them (newest first): encryption always
//! uses the newest, decryption tries each in order and stops at the
//! first success. Tokens written under a retired secret stay readable
//! until they are rewritten.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use argon2::{Argon2, ParamsBuilder};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;
use tracing::debug;

/// Application-specific salt for key derivation
const APP_SALT: &[u8] = b"mail-identity.v1.token.salt.2026";

/// Nonce size for AES-GCM (96 bits / 12 bytes)
const NONCE_SIZE: usize = 12;

/// Encryption errors
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Failed to derive encryption key: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Invalid encrypted data format: {0}")]
    InvalidFormat(String),
}

/// Token cipher over a prioritized list of tenant secrets.
pub struct TokenCipher {
    /// Newest secret first; decryption falls back through the rest.
    ciphers: Vec<Aes256Gcm>,
}

impl TokenCipher {
    /// Build a cipher from tenant secrets, newest first.
    pub fn new<S: AsRef<str>>(secrets: &[S]) -> Result<Self, EncryptionError> {
        if secrets.is_empty() {
            return Err(EncryptionError::KeyDerivation(
                "At least one secret is required".to_string(),
            ));
        }

        let mut ciphers = Vec::with_capacity(secrets.len());
        for secret in secrets {
            let key = derive_key(secret.as_ref())?;
            ciphers.push(Aes256Gcm::new(&key.into()));
        }

        debug!(keys = ciphers.len(), "Initialized token cipher");
        Ok(Self { ciphers })
    }

    /// Encrypt a plaintext token under the newest secret.
    ///
    /// Returns a base64-encoded string containing: nonce || ciphertext
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        if plaintext.is_empty() {
            return Err(EncryptionError::Encryption(
                "Cannot encrypt empty plaintext".to_string(),
            ));
        }

        // Generate random nonce
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        use aes_gcm::aead::rand_core::RngCore;
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self.ciphers[0]
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::Encryption(format!("AES-GCM encryption failed: {}", e)))?;

        // Combine nonce + ciphertext
        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(&combined))
    }

    /// Decrypt a base64-encoded token, trying each secret in order.
    ///
    /// Expects format: nonce || ciphertext (both base64-encoded)
    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        if encrypted.is_empty() {
            return Err(EncryptionError::InvalidFormat(
                "Cannot decrypt empty string".to_string(),
            ));
        }

        let combined = BASE64.decode(encrypted).map_err(|e| {
            EncryptionError::InvalidFormat(format!("Invalid base64 encoding: {}", e))
        })?;

        if combined.len() < NONCE_SIZE {
            return Err(EncryptionError::InvalidFormat(format!(
                "Encrypted data too short: {} bytes",
                combined.len()
            )));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        for (index, cipher) in self.ciphers.iter().enumerate() {
            if let Ok(plaintext_bytes) = cipher.decrypt(nonce, ciphertext) {
                if index > 0 {
                    debug!(key_index = index, "Decrypted token with a retired secret");
                }
                return String::from_utf8(plaintext_bytes).map_err(|e| {
                    EncryptionError::Decryption(format!("Decrypted data is not valid UTF-8: {}", e))
                });
            }
        }

        Err(EncryptionError::Decryption(format!(
            "No key could decrypt the token (tried {})",
            self.ciphers.len()
        )))
    }
}

/// Derive an AES-256 key from a tenant secret with Argon2id.
fn derive_key(secret: &str) -> Result<[u8; 32], EncryptionError> {
    let mut output_key = [0u8; 32];

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MiB memory
        .t_cost(3) // 3 iterations
        .p_cost(4) // 4 parallelism
        .build()
        .map_err(|e| {
            EncryptionError::KeyDerivation(format!("Failed to build Argon2 params: {}", e))
        })?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    argon2
        .hash_password_into(secret.as_bytes(), APP_SALT, &mut output_key)
        .map_err(|e| {
            EncryptionError::KeyDerivation(format!("Argon2 key derivation failed: {}", e))
        })?;

    Ok(output_key)
}
