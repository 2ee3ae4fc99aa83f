use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::RelayError;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `body` keyed by `secret`.
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String, RelayError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| RelayError::InvalidSecret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature produced by [`sign_payload`].
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
