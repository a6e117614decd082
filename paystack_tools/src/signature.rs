//! Webhook signatures.
//!
//! Paystack signs every webhook with HMAC-SHA512 over the raw request body, keyed with the merchant's secret key, and
//! sends the hex digest in the `x-paystack-signature` header. The signature must be checked against the bytes exactly
//! as they arrived. Parsing and re-serializing the JSON first will change whitespace or key order and break the match.
use hmac::{Hmac, Mac};
use log::{trace, warn};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Calculates the hex-encoded HMAC-SHA512 of `payload` using `secret` as the key.
pub fn calculate_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `provided` against the signature of `payload`. The digest comparison is constant-time.
///
/// An empty secret never validates anything, so a misconfigured server rejects every webhook rather than accepting
/// forgeries.
pub fn signatures_match(secret: &str, payload: &[u8], provided: &str) -> bool {
    if secret.is_empty() {
        warn!("🔐️ No webhook secret is configured. Rejecting signature.");
        return false;
    }
    let provided = match hex::decode(provided.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            trace!("🔐️ Signature is not valid hex. {e}");
            return false;
        },
    };
    let mut mac = match <HmacSha512 as Mac>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            warn!("🔐️ Could not create HMAC instance. {e}");
            return false;
        },
    };
    mac.update(payload);
    mac.verify_slice(&provided).is_ok()
}
