use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::status::OrderStatus;

// ============================================================================
// Order - Checkout Result and Admin Back-Office Record
// ============================================================================

/// One line of an order. Items snapshot the product name and unit price at
/// checkout time so later catalog edits never rewrite order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub order_code: String,
    pub customer_name: String,
    pub customer_dni: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
    pub status: OrderStatus,
}

impl Order {
    pub fn total_from_items(items: &[OrderItem]) -> f64 {
        items.iter().map(OrderItem::line_total).sum()
    }

    /// Remove one line item and recompute the order total. The removed line
    /// is returned so the caller can restore its stock.
    pub fn remove_item(&mut self, index: usize) -> Result<OrderItem, OrderError> {
        if index >= self.items.len() {
            return Err(OrderError::NoSuchItem(index));
        }
        let removed = self.items.remove(index);
        self.total_amount = Self::total_from_items(&self.items);
        Ok(removed)
    }

    pub fn set_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        self.status = self.status.transition_to(next)?;
        Ok(())
    }
}

/// Order code customers quote when tracking: `ORD-` plus six random digits.
pub fn generate_order_code() -> String {
    let digits: u32 = rand::rng().random_range(100_000..1_000_000);
    format!("ORD-{digits}")
}

// ============================================================================
// New Order - Validated Checkout Output
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_dni: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
}

impl NewOrder {
    /// Assign identity and the initial status. Every order starts its life
    /// as `Recibido`.
    pub fn into_order(self) -> Order {
        Order {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            order_code: generate_order_code(),
            customer_name: self.customer_name,
            customer_dni: self.customer_dni,
            customer_phone: self.customer_phone,
            shipping_address: self.shipping_address,
            items: self.items,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            installments: self.installments,
            status: OrderStatus::Received,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
