//! AES-256-GCM sealing of entry values under a phrase-derived key

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use sha2::{Digest, Sha256};

use crate::domain::entities::entry::NONCE_LENGTH;
use crate::errors::{DomainError, DomainResult};

/// Size of the derived AES-256 key in bytes
pub const KEY_LENGTH: usize = 32;

/// Seals and opens entry values.
///
/// The per-entry key is `SHA-256(master_key ‖ secret_phrase)`; the same
/// (master key, phrase) pair always yields the same key, so neither the
/// phrase nor the key is ever stored.
#[derive(Clone)]
pub struct EntryCipher {
    master_key: Vec<u8>,
}

impl EntryCipher {
    pub fn new(master_key: impl Into<Vec<u8>>) -> Self {
        Self {
            master_key: master_key.into(),
        }
    }

    /// Derive the symmetric key for a secret phrase
    pub fn derive_key(&self, secret_phrase: &str) -> [u8; KEY_LENGTH] {
        let mut hasher = Sha256::new();
        hasher.update(&self.master_key);
        hasher.update(secret_phrase.as_bytes());
        hasher.finalize().into()
    }

    /// Encrypt `plaintext` with no associated data
    pub fn seal(
        &self,
        plaintext: &[u8],
        nonce: &[u8; NONCE_LENGTH],
        secret_phrase: &str,
    ) -> DomainResult<Vec<u8>> {
        let key = self.derive_key(secret_phrase);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| DomainError::Internal {
                message: format!("Encryption failed: {}", e),
            })
    }

    /// Decrypt `ciphertext`; `None` when the phrase is wrong or the data is
    /// corrupted (the two cannot be told apart).
    pub fn open(
        &self,
        ciphertext: &[u8],
        nonce: &[u8; NONCE_LENGTH],
        secret_phrase: &str,
    ) -> Option<Vec<u8>> {
        let key = self.derive_key(secret_phrase);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        cipher.decrypt(Nonce::from_slice(nonce), ciphertext).ok()
    }
}

impl std::fmt::Debug for EntryCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryCipher").finish_non_exhaustive()
    }
}
