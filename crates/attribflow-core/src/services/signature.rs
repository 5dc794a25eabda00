/// Webhook signature verification
///
/// The storefront signs the raw request body with HMAC-SHA256 and sends the
/// base64 digest in a header. The body must be verified unparsed, and the
/// comparison must be constant-time; timing side-channel safety is part of
/// the contract here, not an optimization.
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the base64 HMAC-SHA256 header against the raw body.
///
/// Returns false for a missing/undecodable header or an empty secret; the
/// caller surfaces a single authorization error either way, without
/// disclosing which part mismatched.
pub fn verify_webhook_signature(secret: &str, raw_body: &[u8], header_b64: &str) -> bool {
    if secret.is_empty() || header_b64.is_empty() {
        return false;
    }

    let Ok(expected) = BASE64.decode(header_b64.trim()) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);

    // verify_slice is the constant-time comparison
    mac.verify_slice(&expected).is_ok()
}

/// Computes the base64 signature the way the storefront does; used by tests
/// and by local webhook replay tooling.
pub fn sign_body(secret: &str, raw_body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123";

    #[test]
    fn test_valid_signature_accepted() {
        let body = br#"{"id": 42, "title": "Tote"}"#;
        let signature = sign_body(SECRET, body);
        assert!(verify_webhook_signature(SECRET, body, &signature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = br#"{"id": 42}"#;
        let signature = sign_body("other_secret", body);
        assert!(!verify_webhook_signature(SECRET, body, &signature));
    }

    #[test]
    fn test_modified_payload_rejected() {
        let body = br#"{"id": 42}"#;
        let signature = sign_body(SECRET, body);
        assert!(!verify_webhook_signature(
            SECRET,
            br#"{"id": 42, "hacked": true}"#,
            &signature
        ));
    }

    #[test]
    fn test_missing_or_garbage_header_rejected() {
        let body = br#"{"id": 42}"#;
        assert!(!verify_webhook_signature(SECRET, body, ""));
        assert!(!verify_webhook_signature(SECRET, body, "not base64 !!!"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let body = br#"{"id": 42}"#;
        let signature = sign_body(SECRET, body);
        assert!(!verify_webhook_signature("", body, &signature));
    }
}
