use serde::{Deserialize, Serialize};

// ============================================================================
// Payment - Thin Surface over the Card Gateway
// ============================================================================
//
// The gateway itself is an opaque collaborator; locally a payment is only
// ever Pending, Approved, or Declined. This module covers the three
// exchanges the storefront needs: session creation, authorization, and the
// asynchronous webhook notification.
//
// ============================================================================

mod gateway;
mod session;
mod webhook;

pub use gateway::{
    process_response, AuthorizeRequest, GatewayResponse, PaymentGateway, PaymentOutcome,
    SandboxGateway,
};
pub use session::{create_session, PaymentSession, SessionRequest};
pub use webhook::{verify_signature, PaymentNotification};

/// Response codes the processor uses for an approved authorization.
pub(crate) const APPROVED_CODES: &[&str] = &["0", "00", "000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Declined,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Approved => "APPROVED",
            PaymentStatus::Declined => "DECLINED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    PEN,
    USD,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::PEN => "PEN",
            Currency::USD => "USD",
        }
    }
}

pub(crate) fn default_currency() -> Currency {
    Currency::PEN
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Order code must be at least 3 characters")]
    InvalidOrderCode,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Payment notification is missing required fields")]
    IncompleteNotification,
}

/// Syntactic email check: one `@`, a dotted domain, no whitespace.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("cliente@example.com"));
        assert!(is_valid_email("a.b@mail.example.pe"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("cliente@example"));
        assert!(!is_valid_email("cliente@.com"));
        assert!(!is_valid_email("cli ente@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn status_labels() {
        assert_eq!(PaymentStatus::Approved.as_str(), "APPROVED");
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Declined).unwrap(),
            "\"DECLINED\""
        );
    }
}
