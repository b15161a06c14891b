//! Field-level encryption collaborator.
//!
//! Sensitive personal fields (contact names, notes, interaction comments) are
//! stored as AES-256-GCM ciphertext with a random per-record nonce prepended
//! and the whole blob base64-encoded. The key is derived once at startup as
//! SHA-256 of the configured secret.
//!
//! `EncryptedString` is the only shape services may persist into an encrypted
//! column: it cannot be built from arbitrary plaintext, so a plaintext value
//! can never be bound where ciphertext belongs.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("ciphertext is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("ciphertext is truncated or corrupt")]
    Malformed,
    #[error("decryption failed")]
    Crypto,
}

/// Ciphertext wrapper. Constructed only by [`FieldCipher::encrypt`] or by
/// hydration from a database column; plain strings cannot become one.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct EncryptedString(String);

impl EncryptedString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Symmetric cipher over opaque strings. Empty input passes through as the
/// empty string in both directions, matching the collaborator contract.
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    pub fn from_secret(secret: &str) -> Self {
        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key).expect("SHA-256 digest is a valid AES key");
        Self { cipher }
    }

    pub fn encrypt(&self, plaintext: &str) -> EncryptedString {
        if plaintext.is_empty() {
            return EncryptedString(String::new());
        }
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .expect("AES-GCM encryption is infallible for in-memory buffers");

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        EncryptedString(BASE64.encode(blob))
    }

    pub fn decrypt(&self, value: &EncryptedString) -> Result<String, CipherError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        let blob = BASE64.decode(value.as_str().as_bytes())?;
        if blob.len() <= NONCE_LEN {
            return Err(CipherError::Malformed);
        }
        let (nonce_raw, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_raw);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::Crypto)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Crypto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::from_secret("unit-test-secret")
    }

    #[test]
    fn test_round_trip() {
        let c = cipher();
        for s in ["a", "Test Person", "комментарий", "line\nbreak", "  "] {
            let enc = c.encrypt(s);
            assert_ne!(enc.as_str(), s);
            assert_eq!(c.decrypt(&enc).unwrap(), s);
        }
    }

    #[test]
    fn test_empty_passes_through() {
        let c = cipher();
        let enc = c.encrypt("");
        assert!(enc.is_empty());
        assert_eq!(c.decrypt(&enc).unwrap(), "");
    }

    #[test]
    fn test_random_nonce_gives_distinct_ciphertexts() {
        let c = cipher();
        let a = c.encrypt("same plaintext");
        let b = c.encrypt("same plaintext");
        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(c.decrypt(&a).unwrap(), c.decrypt(&b).unwrap());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let c = cipher();
        let enc = c.encrypt("secret");
        let mut blob = BASE64.decode(enc.as_str()).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        let tampered = EncryptedString(BASE64.encode(blob));
        assert!(c.decrypt(&tampered).is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let enc = cipher().encrypt("secret");
        let other = FieldCipher::from_secret("different-secret");
        assert!(other.decrypt(&enc).is_err());
    }

    #[test]
    fn test_garbage_input_is_an_error_not_a_panic() {
        let c = cipher();
        assert!(c.decrypt(&EncryptedString("not base64!!".into())).is_err());
        assert!(c.decrypt(&EncryptedString("YWJj".into())).is_err()); // too short
    }
}
