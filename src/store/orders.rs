use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use super::products::{fetch_for_update, persist_stock};
use super::StoreError;
use crate::domain::order::{generate_order_code, NewOrder, Order, OrderItem, OrderStatus};

// ============================================================================
// Order Store
// ============================================================================
//
// Checkout, item removal, and deletion all run as single transactions so an
// order row and the stock it moved never diverge. Compensation (restocking)
// is tolerant: a product that vanished since purchase is logged and skipped.
//
// ============================================================================

const SELECT_COLUMNS: &str = "id, created_at, order_code, customer_name, customer_dni, \
     customer_phone, shipping_address, items, total_amount, payment_method, \
     installments, status";

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    order_code: String,
    customer_name: String,
    customer_dni: String,
    customer_phone: String,
    shipping_address: String,
    items: Json<Vec<OrderItem>>,
    total_amount: f64,
    payment_method: String,
    installments: i32,
    status: String,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, StoreError> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("unknown order status '{}'", self.status)))?;
        Ok(Order {
            id: self.id,
            created_at: self.created_at,
            order_code: self.order_code,
            customer_name: self.customer_name,
            customer_dni: self.customer_dni,
            customer_phone: self.customer_phone,
            shipping_address: self.shipping_address,
            items: self.items.0,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            installments: self.installments,
            status,
        })
    }
}

pub struct OrderStore {
    pool: PgPool,
}

impl OrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order and deduct stock for every line, atomically.
    /// A missing product or insufficient-data stock error aborts the whole
    /// checkout and rolls everything back. A colliding random order code is
    /// retried once with a fresh code.
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, StoreError> {
        let mut order = new_order.into_order();
        match self.try_create(&order).await {
            Err(StoreError::Database(err)) if is_order_code_collision(&err) => {
                order.order_code = generate_order_code();
                self.try_create(&order).await?;
                Ok(order)
            }
            Err(err) => Err(err),
            Ok(()) => Ok(order),
        }
    }

    async fn try_create(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, created_at, order_code, customer_name, customer_dni, \
             customer_phone, shipping_address, items, total_amount, payment_method, \
             installments, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(order.id)
        .bind(order.created_at)
        .bind(&order.order_code)
        .bind(&order.customer_name)
        .bind(&order.customer_dni)
        .bind(&order.customer_phone)
        .bind(&order.shipping_address)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.payment_method)
        .bind(order.installments)
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await?;

        for item in lock_order(&order.items) {
            let mut product = fetch_for_update(&mut tx, item.product_id)
                .await?
                .ok_or(StoreError::NotFound("product"))?;
            product.deduct(item.quantity, item.size.as_deref())?;
            persist_stock(&mut tx, &product).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM orders WHERE status = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM orders ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(OrderRow::into_order).collect()
    }

    pub async fn find_by_code(&self, order_code: &str) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE order_code = $1"
        ))
        .bind(order_code)
        .fetch_optional(&self.pool)
        .await?;
        row.map(OrderRow::into_order).transpose()
    }

    /// Move an order to `next`, rejecting backward or same-status moves.
    pub async fn set_status(&self, id: Uuid, next: OrderStatus) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut order = row
            .ok_or(StoreError::NotFound("order"))?
            .into_order()?;

        order.set_status(next)?;

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(order.status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Remove one line from an order and put its stock back. Restock is best
    /// effort: the line leaves the order even when the product is gone.
    pub async fn remove_item(&self, id: Uuid, index: usize) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut order = row
            .ok_or(StoreError::NotFound("order"))?
            .into_order()?;

        let removed = order.remove_item(index)?;
        restore_line(&mut tx, &order.order_code, &removed).await?;

        sqlx::query("UPDATE orders SET items = $2, total_amount = $3 WHERE id = $1")
            .bind(id)
            .bind(Json(&order.items))
            .bind(order.total_amount)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Delete an order and return every line's stock to inventory.
    pub async fn delete(&self, id: Uuid) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let order = row
            .ok_or(StoreError::NotFound("order"))?
            .into_order()?;

        for item in lock_order(&order.items) {
            restore_line(&mut tx, &order.order_code, item).await?;
        }

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Confirm an order after an approved payment notification. Idempotent:
    /// anything past Recibido is left alone.
    pub async fn confirm_paid(&self, order_code: &str) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE order_code = $1 FOR UPDATE"
        ))
        .bind(order_code)
        .fetch_optional(&mut *tx)
        .await?;
        let mut order = row
            .ok_or(StoreError::NotFound("order"))?
            .into_order()?;

        if order.status == OrderStatus::Received {
            order.set_status(OrderStatus::Confirmed)?;
            sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
                .bind(order.id)
                .bind(order.status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(order)
    }
}

/// Order lines sorted by product id. Every transaction that locks multiple
/// product rows must take them in this order, otherwise two concurrent
/// transactions sharing products can deadlock.
fn lock_order(items: &[OrderItem]) -> Vec<&OrderItem> {
    let mut lines: Vec<&OrderItem> = items.iter().collect();
    lines.sort_by_key(|item| item.product_id);
    lines
}

fn is_order_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some("orders_order_code_key")
        }
        _ => false,
    }
}

/// Put one order line's stock back on the shelf. Failures are logged rather
/// than propagated so admin cleanup never gets stuck on a product that was
/// deleted or reshaped after the sale.
async fn restore_line(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_code: &str,
    item: &OrderItem,
) -> sqlx::Result<()> {
    match fetch_for_update(tx, item.product_id).await? {
        Some(mut product) => {
            if let Err(err) = product.restock(item.quantity, item.size.as_deref()) {
                warn!(
                    order_code = %order_code,
                    product_id = %item.product_id,
                    error = %err,
                    "⚠️ Could not restore stock for removed line"
                );
                return Ok(());
            }
            persist_stock(tx, &product).await?;
        }
        None => {
            warn!(
                order_code = %order_code,
                product_id = %item.product_id,
                "⚠️ Product no longer exists, skipping stock restore"
            );
        }
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================
