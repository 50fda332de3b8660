//! Razorpay integration: server-side order creation and payment signature
//! verification. Checkout itself happens in Razorpay's hosted widget.

use hmac::{Hmac, Mac};
use sha2::Sha256;

pub mod handlers;
pub mod razorpay;

type HmacSha256 = Hmac<Sha256>;

fn signature_mac(secret: &str, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Some(mac)
}

/// The hex signature Razorpay hands the client after a successful payment:
/// `HMAC-SHA256(key_secret, "<order_id>|<payment_id>")`.
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mac = signature_mac(secret, order_id, payment_id)?;
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a client-supplied signature in constant time. Anything that is not
/// valid hex fails.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let Ok(claimed) = hex::decode(signature.trim()) else {
        return false;
    };
    signature_mac(secret, order_id, payment_id)
        .map(|mac| mac.verify_slice(&claimed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "rzp_test_secret";

    #[test]
    fn test_known_signature_verifies() {
        let sig = payment_signature(SECRET, "order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify_payment_signature(
            SECRET,
            "order_9A33XWu170gUtm",
            "pay_29QQoUBi66xm2f",
            &sig
        ));
    }

    #[test]
    fn test_single_bit_flip_fails() {
        let sig = payment_signature(SECRET, "order_1", "pay_1").unwrap();
        let mut bytes = hex::decode(&sig).unwrap();
        for i in 0..bytes.len() {
            bytes[i] ^= 0x01;
            assert!(!verify_payment_signature(
                SECRET,
                "order_1",
                "pay_1",
                &hex::encode(&bytes)
            ));
            bytes[i] ^= 0x01;
        }
    }

    #[test]
    fn test_swapped_ids_fail() {
        let sig = payment_signature(SECRET, "order_1", "pay_1").unwrap();
        assert!(!verify_payment_signature(SECRET, "pay_1", "order_1", &sig));
        assert!(!verify_payment_signature("other", "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_non_hex_or_truncated_signature_fails() {
        let sig = payment_signature(SECRET, "order_1", "pay_1").unwrap();
        assert!(!verify_payment_signature(SECRET, "order_1", "pay_1", "not-hex"));
        assert!(!verify_payment_signature(SECRET, "order_1", "pay_1", &sig[..32]));
        assert!(!verify_payment_signature(SECRET, "order_1", "pay_1", ""));
    }
}
