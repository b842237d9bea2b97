use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{default_currency, Currency, PaymentStatus, APPROVED_CODES};

// ============================================================================
// Payment Gateway - Opaque Authorization Call
// ============================================================================

/// Card authorization request forwarded to the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeRequest {
    pub session_id: String,
    pub transaction_token: String,
    pub order_code: String,
    pub customer_email: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: Currency,
}

/// Raw gateway reply. Response codes follow the processor's conventions;
/// everything except the approved codes is a decline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub transaction_id: String,
    pub response_code: String,
    pub response_message: String,
    pub authorization_code: Option<String>,
}

/// Processed outcome, the only payment state the storefront keeps.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub response_code: String,
    pub response_message: String,
    pub authorization_code: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub order_code: String,
    pub timestamp: DateTime<Utc>,
}

pub fn process_response(request: &AuthorizeRequest, response: GatewayResponse) -> PaymentOutcome {
    let status = if APPROVED_CODES.contains(&response.response_code.as_str()) {
        PaymentStatus::Approved
    } else {
        PaymentStatus::Declined
    };

    PaymentOutcome {
        transaction_id: response.transaction_id,
        status,
        response_code: response.response_code,
        response_message: response.response_message,
        authorization_code: response.authorization_code,
        amount: request.amount,
        currency: request.currency,
        order_code: request.order_code.clone(),
        timestamp: Utc::now(),
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize(&self, request: &AuthorizeRequest) -> anyhow::Result<GatewayResponse>;
}

/// Sandbox stand-in for the real processor. Approves everything except
/// tokens carrying the decline trigger marker, so both paths are exercisable
/// deterministically.
pub struct SandboxGateway;

const DECLINE_TRIGGER: &str = "declined";

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn authorize(&self, request: &AuthorizeRequest) -> anyhow::Result<GatewayResponse> {
        let nonce: [u8; 5] = rand::rng().random();
        let transaction_id = format!(
            "txn_{}_{}",
            Utc::now().timestamp_millis(),
            hex::encode(nonce)
        );

        let response = if request.transaction_token.contains(DECLINE_TRIGGER) {
            GatewayResponse {
                transaction_id,
                response_code: "51".to_string(),
                response_message: "TARJETA SIN FONDOS".to_string(),
                authorization_code: None,
            }
        } else {
            let auth: [u8; 3] = rand::rng().random();
            GatewayResponse {
                transaction_id,
                response_code: "0".to_string(),
                response_message: "AUTORIZADA".to_string(),
                authorization_code: Some(format!("AUTH_{}", hex::encode(auth).to_uppercase())),
            }
        };

        Ok(response)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(token: &str) -> AuthorizeRequest {
        AuthorizeRequest {
            session_id: "session_1".to_string(),
            transaction_token: token.to_string(),
            order_code: "ORD-123456".to_string(),
            customer_email: "cliente@example.com".to_string(),
            amount: 899.0,
            currency: Currency::PEN,
        }
    }

    #[test]
    fn approved_codes_map_to_approved() {
        for code in ["0", "00", "000"] {
            let outcome = process_response(
                &request("tok"),
                GatewayResponse {
                    transaction_id: "txn_1".to_string(),
                    response_code: code.to_string(),
                    response_message: "AUTORIZADA".to_string(),
                    authorization_code: Some("AUTH_1".to_string()),
                },
            );
            assert_eq!(outcome.status, PaymentStatus::Approved);
        }
    }

    #[test]
    fn any_other_code_maps_to_declined() {
        let outcome = process_response(
            &request("tok"),
            GatewayResponse {
                transaction_id: "txn_2".to_string(),
                response_code: "51".to_string(),
                response_message: "TARJETA SIN FONDOS".to_string(),
                authorization_code: None,
            },
        );
        assert_eq!(outcome.status, PaymentStatus::Declined);
        assert!(outcome.authorization_code.is_none());
    }

    #[tokio::test]
    async fn sandbox_approves_ordinary_tokens() {
        let gateway = SandboxGateway;
        let response = gateway.authorize(&request("tok_abc")).await.unwrap();
        assert_eq!(response.response_code, "0");
        assert!(response.authorization_code.is_some());
        assert!(response.transaction_id.starts_with("txn_"));
    }

    #[tokio::test]
    async fn sandbox_declines_trigger_tokens() {
        let gateway = SandboxGateway;
        let response = gateway
            .authorize(&request("tok_declined_card"))
            .await
            .unwrap();
        assert_eq!(response.response_code, "51");
        assert!(response.authorization_code.is_none());

        let outcome = process_response(&request("tok_declined_card"), response);
        assert_eq!(outcome.status, PaymentStatus::Declined);
    }
}
