//! nvgl8r crypto library
//!
//! PIN-derived symmetric encryption for the peer-to-peer data channel.
//! Both peers derive the same AES-256-GCM key from a shared PIN and room
//! name, so no key exchange takes place.
//!
//! - `keys`: PBKDF2-HMAC-SHA256 derivation into an opaque [`PinKey`]
//! - `encrypt`: AES-256-GCM with a fresh random 96-bit nonce per message
//! - `encoding`: base64 helpers and byte-source materialization

pub mod encoding;
pub mod encrypt;
pub mod error;
pub mod keys;
pub mod source;

pub use encoding::{base64_to_bytes, blob_to_bytes, bytes_to_base64};
pub use encrypt::{Sealed, decrypt, decrypt_async, encrypt, encrypt_async};
pub use error::{CryptoError, CryptoResult};
pub use keys::{
    DEFAULT_ROOM, KEY_SIZE, KdfParams, NONCE_SIZE, PBKDF2_ITERATIONS, PinKey, TAG_SIZE,
    derive_key, derive_key_async, derive_key_with,
};
pub use source::{ByteSource, Reader};
