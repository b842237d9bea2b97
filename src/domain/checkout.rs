use serde::Deserialize;

use super::cart::CartItem;
use super::order::{NewOrder, Order, OrderItem};

// ============================================================================
// Checkout - Customer Validation and Order Assembly
// ============================================================================
//
// Validates the checkout form the way the storefront demands it (Peruvian
// DNI, local phone formats) and turns the submitted cart into a NewOrder.
// All checks run before any database work.
//
// ============================================================================

fn default_country() -> String {
    "Perú".to_string()
}

fn default_installments() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub phone: String,
    pub address: String,
    pub department: String,
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl CustomerDetails {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.first_name.trim().is_empty() {
            errors.push("first name is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            errors.push("last name is required".to_string());
        }
        if !is_valid_dni(&self.dni) {
            errors.push("DNI must be exactly 8 digits".to_string());
        }
        if !is_valid_phone(&self.phone) {
            errors.push("phone must contain at least 9 digits".to_string());
        }
        if self.address.trim().is_empty() {
            errors.push("address is required".to_string());
        }
        if self.department.trim().is_empty() {
            errors.push("department is required".to_string());
        }
        if self.city.trim().is_empty() {
            errors.push("city is required".to_string());
        }

        errors
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    pub fn shipping_address(&self) -> String {
        format!(
            "{}, {}, {}",
            self.address.trim(),
            self.city.trim(),
            self.department.trim()
        )
    }
}

pub fn is_valid_dni(dni: &str) -> bool {
    dni.len() == 8 && dni.chars().all(|c| c.is_ascii_digit())
}

/// Optional leading `+`, then digits with spaces or dashes; at least nine
/// digits overall.
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        && rest.chars().filter(char::is_ascii_digit).count() >= 9
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Transfer,
    Card,
}

impl PaymentMethod {
    /// Label stored on the order record.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "Transferencia Bancaria",
            PaymentMethod::Card => "Tarjeta",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerDetails,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_installments")]
    pub installments: i32,
    pub items: Vec<CartItem>,
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.customer.validate();

        if self.items.is_empty() {
            errors.push("cart is empty".to_string());
        }
        for item in &self.items {
            if item.quantity <= 0 {
                errors.push(format!("invalid quantity for {}", item.name));
            }
        }
        if !(1..=3).contains(&self.installments) {
            errors.push("installments must be between 1 and 3".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build the order the storefront persists. Call after [`validate`].
    ///
    /// [`validate`]: CheckoutRequest::validate
    pub fn into_new_order(self) -> NewOrder {
        let items: Vec<OrderItem> = self
            .items
            .into_iter()
            .map(CartItem::into_order_item)
            .collect();
        let total_amount = Order::total_from_items(&items);

        NewOrder {
            customer_name: self.customer.full_name(),
            customer_dni: self.customer.dni.trim().to_string(),
            customer_phone: self.customer.phone.trim().to_string(),
            shipping_address: self.customer.shipping_address(),
            items,
            total_amount,
            payment_method: self.payment_method.label().to_string(),
            installments: self.installments,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
