use aes_gcm::{
    Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use serde::{Deserialize, Serialize};

use crate::encoding::{base64_to_bytes, bytes_to_base64, serde_base64};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{NONCE_SIZE, PinKey};

/// One encrypted message: the base64 nonce and the ciphertext with its 16-byte
/// GCM tag appended. Callers transmit both together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sealed {
    pub iv_base64: String,
    #[serde(with = "serde_base64")]
    pub ciphertext: Vec<u8>,
}

impl Sealed {
    pub fn open(&self, key: &PinKey) -> CryptoResult<Vec<u8>> {
        decrypt(&self.iv_base64, &self.ciphertext, key)
    }
}

/// Encrypt `plaintext` with AES-256-GCM under a fresh random 12-byte nonce.
pub fn encrypt(plaintext: &[u8], key: &PinKey) -> CryptoResult<Sealed> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .cipher()
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    Ok(Sealed {
        iv_base64: bytes_to_base64(&nonce_bytes),
        ciphertext,
    })
}

/// Decrypt and verify a ciphertext produced by [`encrypt`].
///
/// Any tag mismatch is reported as [`CryptoError::Authentication`] and no
/// plaintext is returned.
pub fn decrypt(iv_base64: &str, ciphertext: &[u8], key: &PinKey) -> CryptoResult<Vec<u8>> {
    let nonce_bytes = base64_to_bytes(iv_base64)?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(CryptoError::NonceLength {
            expected: NONCE_SIZE,
            actual: nonce_bytes.len(),
        });
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    key.cipher()
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Authentication)
}

pub async fn encrypt_async(plaintext: Vec<u8>, key: &PinKey) -> CryptoResult<Sealed> {
    let key = key.clone();
    tokio::task::spawn_blocking(move || encrypt(&plaintext, &key)).await?
}

pub async fn decrypt_async(
    iv_base64: String,
    ciphertext: Vec<u8>,
    key: &PinKey,
) -> CryptoResult<Vec<u8>> {
    let key = key.clone();
    tokio::task::spawn_blocking(move || decrypt(&iv_base64, &ciphertext, &key)).await?
}
