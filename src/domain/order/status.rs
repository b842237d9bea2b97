use serde::{Deserialize, Serialize};

use super::errors::OrderError;

// ============================================================================
// Order Status - Fulfillment Lifecycle
// ============================================================================
//
// Wire labels stay in Spanish; that is the storefront's data format for the
// status column and every API payload.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Recibido")]
    Received,
    #[serde(rename = "Confirmado")]
    Confirmed,
    #[serde(rename = "En proceso")]
    InProcess,
    #[serde(rename = "Entregado")]
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Recibido",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::InProcess => "En proceso",
            OrderStatus::Delivered => "Entregado",
        }
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Received => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::InProcess => 2,
            OrderStatus::Delivered => 3,
        }
    }

    /// An order only moves forward through the lifecycle. Skipping a step is
    /// allowed; moving backward or repeating the current status is not.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OrderError::InvalidStatusTransition { from: self, to: next })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Recibido" => Ok(OrderStatus::Received),
            "Confirmado" => Ok(OrderStatus::Confirmed),
            "En proceso" => Ok(OrderStatus::InProcess),
            "Entregado" => Ok(OrderStatus::Delivered),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(OrderStatus::Received.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::InProcess));
        assert!(OrderStatus::InProcess.can_transition_to(OrderStatus::Delivered));
        // Skipping a step is still forward
        assert!(OrderStatus::Received.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn backward_and_repeated_transitions_are_rejected() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Received));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Received));
        assert!(!OrderStatus::InProcess.can_transition_to(OrderStatus::InProcess));

        let err = OrderStatus::Delivered
            .transition_to(OrderStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn serializes_with_spanish_labels() {
        let json = serde_json::to_string(&OrderStatus::InProcess).unwrap();
        assert_eq!(json, "\"En proceso\"");

        let parsed: OrderStatus = serde_json::from_str("\"Entregado\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delivered);
    }

    #[test]
    fn parses_stored_labels() {
        for status in [
            OrderStatus::Received,
            OrderStatus::Confirmed,
            OrderStatus::InProcess,
            OrderStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Cancelado".parse::<OrderStatus>().is_err());
    }
}
