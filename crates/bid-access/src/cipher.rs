//! Symmetric encryption of bid-signature blobs.
//!
//! AES-256-GCM with a 12-byte random nonce prepended to the ciphertext;
//! the combined (nonce || ciphertext) travels base64-encoded. The key is
//! whatever the decryption gateway releases once access-control conditions
//! are satisfied.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_LEN {
        bail!(
            "Symmetric key must be {} bytes, got {}",
            KEY_LEN,
            key.len()
        );
    }
    Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)))
}

/// Encrypt a plaintext string into a base64 (nonce || ciphertext) blob.
///
/// A fresh random nonce is drawn per call, so encrypting the same
/// plaintext twice yields different blobs.
pub fn encrypt_string(plaintext: &str, key: &[u8]) -> Result<String> {
    let cipher = build_cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| anyhow!("Encryption failed"))?;

    let mut combined = nonce.to_vec();
    combined.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(combined))
}

/// Decrypt a base64 (nonce || ciphertext) blob back to plaintext.
pub fn decrypt_string(blob: &str, key: &[u8]) -> Result<String> {
    let combined = STANDARD
        .decode(blob)
        .context("Encrypted blob is not valid base64")?;

    if combined.len() <= NONCE_LEN {
        bail!(
            "Encrypted blob is shorter than the {}-byte nonce",
            NONCE_LEN
        );
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let cipher = build_cipher(key)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| anyhow!("Decryption failed - wrong key or corrupted ciphertext"))?;

    String::from_utf8(plaintext).context("Decrypted bytes are not valid UTF-8")
}
