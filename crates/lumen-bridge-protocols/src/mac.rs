//! Webhook payload authentication.
//!
//! The gateway signs the exact form-encoded body bytes with HMAC-SHA256,
//! keyed by the raw bytes of a strkey-encoded seed, and sends the base64
//! digest in the [`PAYLOAD_MAC_HEADER`] header. Callback receivers recompute
//! the digest over the body they received and compare with [`verify`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use stellar_strkey::ed25519::PrivateKey;

use crate::error::ProtocolError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload MAC on webhook requests.
pub const PAYLOAD_MAC_HEADER: &str = "X_PAYLOAD_MAC";

/// Decode a strkey-encoded signing seed into its raw key bytes.
pub fn decode_seed(seed: &str) -> Result<Vec<u8>, ProtocolError> {
    let key = PrivateKey::from_string(seed).map_err(|_| ProtocolError::InvalidMacKey)?;
    Ok(key.0.to_vec())
}

/// Compute the MAC header value for a request body:
/// base64(HMAC-SHA256(body, raw_key)).
pub fn sign(raw_key: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(raw_key).expect("HMAC accepts any key length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify a MAC header value against the body it signs.
///
/// The hmac crate's `verify_slice` compares in constant time; malformed
/// base64 is compared against zeros rather than rejected early.
pub fn verify(raw_key: &[u8], body: &[u8], mac_value: &str) -> bool {
    let mut mac = HmacSha256::new_from_slice(raw_key).expect("HMAC accepts any key length");
    mac.update(body);
    let expected = BASE64.decode(mac_value).unwrap_or_else(|_| vec![0u8; 32]);
    mac.verify_slice(&expected).is_ok()
}
