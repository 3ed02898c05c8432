//! Webhook signature verification
//!
//! GitHub signs each delivery with HMAC-SHA256 over the exact body and the
//! shared secret, sent as `X-Hub-Signature-256: sha256=<hex>`. Comparison
//! must be constant-time; `Mac::verify_slice` provides that.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header prefix GitHub uses for SHA-256 signatures
const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a webhook body against its signature header
pub fn verify_signature(secret: &str, body: &[u8], signature_header: &str) -> bool {
    let hex_digest = match signature_header.strip_prefix(SIGNATURE_PREFIX) {
        Some(rest) => rest,
        None => return false,
    };
    let expected = match hex::decode(hex_digest) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the signature header value for a body (used when forwarding and
/// in tests)
pub fn sign(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let body = br#"{"action":"opened"}"#;
        let header = sign("s3cret", body);
        assert!(header.starts_with("sha256="));
        assert!(verify_signature("s3cret", body, &header));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let header = sign("right", body);
        assert!(!verify_signature("wrong", body, &header));
    }

    #[test]
    fn tampered_body_fails() {
        let header = sign("s3cret", b"original");
        assert!(!verify_signature("s3cret", b"tampered", &header));
    }

    #[test]
    fn malformed_headers_fail() {
        assert!(!verify_signature("s", b"x", "sha1=abcd"));
        assert!(!verify_signature("s", b"x", "sha256=not-hex"));
        assert!(!verify_signature("s", b"x", ""));
    }
}
