//! Anonymous sealed box backend.
//!
//! Output layout, base64 encoded:
//!
//! ```text
//! ephemeral_pk (32) || xsalsa20poly1305(plaintext) (len + 16)
//! ```
//!
//! The 24-byte nonce is `BLAKE2b(ephemeral_pk || recipient_pk)`, so every call
//! gets a fresh nonce along with its fresh ephemeral keypair. The nonce is
//! derived on both sides and never transmitted.

use base64::Engine;
use crypto_box::aead::OsRng;
use crypto_box::{PublicKey, SecretKey};
use tracing::trace;

use super::Cipher;
use crate::core::domain::{EnvironmentKey, SealedSecret};
use crate::error::{EncodingError, Result};

/// libsodium-compatible `crypto_box_seal`.
pub struct SealedBox;

impl Cipher for SealedBox {
    fn name(&self) -> &'static str {
        "sealed-box"
    }

    fn seal(&self, key: &EnvironmentKey, plaintext: &str) -> Result<SealedSecret> {
        trace!(
            key_id = key.key_id(),
            plaintext_len = plaintext.len(),
            "sealing"
        );

        let recipient = PublicKey::from(*key.public_key());
        // The ephemeral secret key lives and dies inside `seal`.
        let sealed = recipient
            .seal(&mut OsRng, plaintext.as_bytes())
            .map_err(|_| EncodingError::Seal)?;

        trace!(ciphertext_len = sealed.len(), "sealed");

        let encoded = base64::engine::general_purpose::STANDARD.encode(&sealed);
        Ok(SealedSecret::new(key.key_id(), encoded))
    }
}

/// Open a base64 sealed box with the recipient's secret key.
///
/// # Errors
///
/// Returns `EncodingError::Open` if the ciphertext was tampered with or was
/// sealed for a different key.
pub fn open(ciphertext: &str, secret_key: &SecretKey) -> Result<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(ciphertext)
        .map_err(EncodingError::from)?;
    let plaintext = secret_key
        .unseal(&bytes)
        .map_err(|_| EncodingError::Open)?;
    String::from_utf8(plaintext).map_err(|_| EncodingError::Utf8.into())
}
