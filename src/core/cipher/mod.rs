//! Secret sealing.
//!
//! Values are encrypted to an environment's public key so that only the
//! store holding the matching private key can read them.
//!
//! ## Backends
//!
//! - **sealed box**: X25519 + XSalsa20-Poly1305 with an ephemeral sender key,
//!   the construction GitHub decrypts for Actions secrets.

use crate::core::domain::{EnvironmentKey, SealedSecret};
use crate::error::Result;

mod sealed_box;

pub use sealed_box::{open, SealedBox};

/// Sealing backend.
///
/// Implementations are pure: no I/O, no retained key material, and no
/// determinism. Sealing the same value twice yields different ciphertexts.
pub trait Cipher {
    /// Seal `plaintext` for the holder of `key`'s private half.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` if the key is unusable.
    fn seal(&self, key: &EnvironmentKey, plaintext: &str) -> Result<SealedSecret>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Seal a value with the default sealed-box backend.
///
/// This is a convenience wrapper around `SealedBox::seal`.
pub fn seal(key: &EnvironmentKey, plaintext: &str) -> Result<SealedSecret> {
    SealedBox.seal(key, plaintext)
}
