use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{PaymentError, PaymentStatus, APPROVED_CODES};

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Payment Webhook - Asynchronous Gateway Notifications
// ============================================================================
//
// The gateway posts the final result of an authorization out-of-band. The
// raw body is verified against an HMAC-SHA256 hex signature before any JSON
// parsing happens.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub transaction_id: String,
    pub order_code: String,
    pub amount: f64,
    pub currency: String,
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
    #[serde(default)]
    pub authorization_code: Option<String>,
}

impl PaymentNotification {
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.transaction_id.is_empty()
            || self.order_code.is_empty()
            || self.response_code.is_empty()
            || !(self.amount > 0.0)
        {
            return Err(PaymentError::IncompleteNotification);
        }
        Ok(())
    }

    pub fn status(&self) -> PaymentStatus {
        if APPROVED_CODES.contains(&self.response_code.as_str()) {
            PaymentStatus::Approved
        } else {
            PaymentStatus::Declined
        }
    }
}

/// Verify the gateway's hex HMAC-SHA256 signature over the raw payload.
/// Comparison happens in constant time inside the `hmac` crate.
pub fn verify_signature(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn notification(code: &str) -> PaymentNotification {
        PaymentNotification {
            transaction_id: "txn_1".to_string(),
            order_code: "ORD-123456".to_string(),
            amount: 2299.0,
            currency: "PEN".to_string(),
            response_code: code.to_string(),
            response_message: String::new(),
            authorization_code: None,
        }
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"order_code":"ORD-123456"}"#;
        let signature = sign("secret", payload);
        assert!(verify_signature("secret", payload, &signature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"order_code":"ORD-123456"}"#;
        let signature = sign("other_secret", payload);
        assert!(!verify_signature("secret", payload, &signature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = br#"{"amount":100}"#;
        let signature = sign("secret", payload);
        assert!(!verify_signature("secret", br#"{"amount":999}"#, &signature));
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        assert!(!verify_signature("secret", b"payload", "not-hex!"));
        assert!(!verify_signature("secret", b"payload", ""));
    }

    #[test]
    fn approved_code_maps_to_approved() {
        assert_eq!(notification("00").status(), PaymentStatus::Approved);
        assert_eq!(notification("51").status(), PaymentStatus::Declined);
    }

    #[test]
    fn incomplete_notification_is_rejected() {
        let mut n = notification("0");
        n.transaction_id = String::new();
        assert!(matches!(
            n.validate(),
            Err(PaymentError::IncompleteNotification)
        ));

        let mut n = notification("0");
        n.amount = 0.0;
        assert!(n.validate().is_err());

        assert!(notification("0").validate().is_ok());
    }
}
