use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{default_currency, is_valid_email, Currency, PaymentError};
use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Payment Session - Signed Handshake with the Gateway
// ============================================================================
//
// The session ties an order to an amount before the card form ever loads.
// The signature covers merchant, amount, currency, order code, and session
// id so none of them can be swapped client-side.
//
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: Currency,
    pub order_code: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSession {
    pub session_id: String,
    pub merchant_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub order_code: String,
    pub signature: String,
    pub created_at: DateTime<Utc>,
}

pub fn create_session(
    config: &PaymentConfig,
    request: &SessionRequest,
) -> Result<PaymentSession, PaymentError> {
    if !(request.amount > 0.0) {
        return Err(PaymentError::InvalidAmount);
    }
    if request.order_code.trim().len() < 3 {
        return Err(PaymentError::InvalidOrderCode);
    }
    if !is_valid_email(&request.customer_email) {
        return Err(PaymentError::InvalidEmail(request.customer_email.clone()));
    }

    let session_id = generate_session_id();
    let signature = sign_session(
        config,
        request.amount,
        request.currency,
        &request.order_code,
        &session_id,
    );

    Ok(PaymentSession {
        session_id,
        merchant_id: config.merchant_id.clone(),
        amount: request.amount,
        currency: request.currency,
        order_code: request.order_code.clone(),
        signature,
        created_at: Utc::now(),
    })
}

fn generate_session_id() -> String {
    let nonce: [u8; 6] = rand::rng().random();
    format!("session_{}_{}", Utc::now().timestamp_millis(), hex::encode(nonce))
}

/// HMAC-SHA256 over `merchant_id + amount + currency + order_code +
/// session_id`, hex-encoded.
pub fn sign_session(
    config: &PaymentConfig,
    amount: f64,
    currency: Currency,
    order_code: &str,
    session_id: &str,
) -> String {
    let payload = format!(
        "{}{}{}{}{}",
        config.merchant_id,
        amount,
        currency.as_str(),
        order_code,
        session_id
    );
    let mut mac = HmacSha256::new_from_slice(config.session_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaymentConfig {
        PaymentConfig {
            merchant_id: "456879852".to_string(),
            session_secret: "session_secret".to_string(),
            webhook_secret: "webhook_secret".to_string(),
            sandbox: true,
        }
    }

    fn request() -> SessionRequest {
        SessionRequest {
            amount: 2299.0,
            currency: Currency::PEN,
            order_code: "ORD-123456".to_string(),
            customer_email: "cliente@example.com".to_string(),
        }
    }

    #[test]
    fn session_is_created_for_valid_request() {
        let session = create_session(&config(), &request()).unwrap();
        assert!(session.session_id.starts_with("session_"));
        assert_eq!(session.merchant_id, "456879852");
        assert_eq!(session.order_code, "ORD-123456");
        assert_eq!(session.signature.len(), 64); // SHA-256 hex
    }

    #[test]
    fn zero_or_negative_amount_is_rejected() {
        let mut req = request();
        req.amount = 0.0;
        assert!(matches!(
            create_session(&config(), &req),
            Err(PaymentError::InvalidAmount)
        ));

        req.amount = -5.0;
        assert!(matches!(
            create_session(&config(), &req),
            Err(PaymentError::InvalidAmount)
        ));
    }

    #[test]
    fn short_order_code_is_rejected() {
        let mut req = request();
        req.order_code = "12".to_string();
        assert!(matches!(
            create_session(&config(), &req),
            Err(PaymentError::InvalidOrderCode)
        ));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut req = request();
        req.customer_email = "not-an-email".to_string();
        assert!(matches!(
            create_session(&config(), &req),
            Err(PaymentError::InvalidEmail(_))
        ));
    }

    #[test]
    fn signature_is_deterministic_for_same_inputs() {
        let cfg = config();
        let a = sign_session(&cfg, 100.0, Currency::USD, "ORD-111111", "session_x");
        let b = sign_session(&cfg, 100.0, Currency::USD, "ORD-111111", "session_x");
        assert_eq!(a, b);
    }

    #[test]
    fn signature_changes_with_amount_or_secret() {
        let cfg = config();
        let base = sign_session(&cfg, 100.0, Currency::USD, "ORD-111111", "session_x");
        let tampered = sign_session(&cfg, 999.0, Currency::USD, "ORD-111111", "session_x");
        assert_ne!(base, tampered);

        let other_cfg = PaymentConfig {
            session_secret: "other_secret".to_string(),
            ..cfg
        };
        let other = sign_session(&other_cfg, 100.0, Currency::USD, "ORD-111111", "session_x");
        assert_ne!(base, other);
    }
}
