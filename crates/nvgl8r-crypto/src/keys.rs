use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use aes_gcm::{Aes256Gcm, Key, KeyInit};
use hmac::Hmac;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Room used as the salt context when the caller supplies none.
///
/// Every deployment that omits the room shares this salt, so identical PINs
/// produce identical keys across them. Pass an explicit room whenever one
/// exists.
pub const DEFAULT_ROOM: &str = "nvgl8r";

/// PBKDF2 rounds. Tuned for acceptable derivation time on phones; peers must
/// agree on it or they derive different keys.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;

/// Tunable key-derivation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

/// AES-256-GCM key derived from a PIN and room.
///
/// The raw key bytes are wiped right after the cipher is keyed and are never
/// exposed; the handle can only be used through [`crate::encrypt()`] and
/// [`crate::decrypt()`]. Cloning is cheap and clones share the same cipher.
#[derive(Clone)]
pub struct PinKey {
    cipher: Arc<Aes256Gcm>,
}

impl PinKey {
    pub(crate) fn cipher(&self) -> &Aes256Gcm {
        &self.cipher
    }
}

impl fmt::Debug for PinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinKey([REDACTED])")
    }
}

/// Salt = SHA-256(room). Both peers know the room, so no salt is exchanged.
fn room_salt(room: &str) -> [u8; 32] {
    Sha256::digest(room.as_bytes()).into()
}

fn stretch_pin(pin: &str, salt: &[u8], iterations: u32) -> CryptoResult<Zeroizing<[u8; KEY_SIZE]>> {
    if iterations == 0 {
        return Err(CryptoError::Derivation(
            "iteration count must be non-zero".into(),
        ));
    }

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(pin.as_bytes(), salt, iterations, &mut key[..])
        .map_err(|e| CryptoError::Derivation(e.to_string()))?;
    Ok(key)
}

/// Derive the session key for `(pin, room)` with the default parameters.
///
/// `room` falls back to [`DEFAULT_ROOM`]. Derivation is a pure function of its
/// inputs, so callers should derive once per session and reuse the handle.
pub fn derive_key(pin: &str, room: Option<&str>) -> CryptoResult<PinKey> {
    derive_key_with(pin, room, &KdfParams::default())
}

/// Same as [`derive_key`] with explicit KDF parameters.
pub fn derive_key_with(pin: &str, room: Option<&str>, params: &KdfParams) -> CryptoResult<PinKey> {
    let started = Instant::now();
    let salt = room_salt(room.unwrap_or(DEFAULT_ROOM));
    let key = stretch_pin(pin, &salt, params.iterations)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    debug!(
        iterations = params.iterations,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Derived PIN key"
    );

    Ok(PinKey {
        cipher: Arc::new(cipher),
    })
}

/// Runs [`derive_key`] on the blocking pool; 100k PBKDF2 rounds would
/// otherwise stall the async runtime.
pub async fn derive_key_async(pin: &str, room: Option<&str>) -> CryptoResult<PinKey> {
    let pin = Zeroizing::new(pin.to_owned());
    let room = room.map(str::to_owned);
    tokio::task::spawn_blocking(move || derive_key(&pin, room.as_deref())).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_salt_is_sha256_of_room() {
        assert_eq!(
            hex::encode(room_salt("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn pbkdf2_matches_known_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 1, 32)
        let key = stretch_pin("password", b"salt", 1).unwrap();
        assert_eq!(
            hex::encode(key.as_slice()),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let params = KdfParams { iterations: 0 };
        let err = derive_key_with("1234", Some("abcd"), &params).unwrap_err();
        assert!(matches!(err, CryptoError::Derivation(_)));
    }

    #[test]
    fn empty_pin_is_accepted() {
        let params = KdfParams { iterations: 10 };
        assert!(derive_key_with("", None, &params).is_ok());
    }

    #[test]
    fn debug_output_is_redacted() {
        let params = KdfParams { iterations: 10 };
        let key = derive_key_with("1234", Some("abcd"), &params).unwrap();
        assert_eq!(format!("{:?}", key), "PinKey([REDACTED])");
    }

    #[test]
    fn block_cipher_wipes_round_keys_on_drop() {
        fn wiped_on_drop<T: zeroize::ZeroizeOnDrop>() {}
        wiped_on_drop::<aes::Aes256>();
    }

    #[test]
    fn kdf_params_default_from_empty_config() {
        let params: KdfParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, KdfParams::default());
        assert_eq!(params.iterations, PBKDF2_ITERATIONS);
    }
}
