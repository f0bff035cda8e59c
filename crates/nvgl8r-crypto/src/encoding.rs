use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::CryptoResult;
use crate::source::ByteSource;

/// Input bytes per encode step. A multiple of 3 keeps padding out of the
/// middle of the output, so chunked and single-shot encodings are identical.
const ENCODE_CHUNK: usize = 0x8000 - (0x8000 % 3);

/// Standard (padded) base64 of an arbitrary buffer.
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(base64::encoded_len(bytes.len(), true).unwrap_or(0));
    for chunk in bytes.chunks(ENCODE_CHUNK) {
        BASE64.encode_string(chunk, &mut out);
    }
    out
}

/// Decode standard base64. Malformed input yields an error and no bytes.
pub fn base64_to_bytes(encoded: &str) -> CryptoResult<Vec<u8>> {
    Ok(BASE64.decode(encoded)?)
}

/// Read a byte source fully into memory.
pub async fn blob_to_bytes<S: ByteSource>(source: S) -> CryptoResult<Vec<u8>> {
    source.materialize().await
}

/// `#[serde(with = "serde_base64")]` for binary fields carried as base64 strings.
pub(crate) mod serde_base64 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::bytes_to_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        super::base64_to_bytes(&encoded).map_err(D::Error::custom)
    }
}
