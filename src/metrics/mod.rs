use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Counters for the storefront's business events:
// - Orders created / deleted and line removals
// - Payment sessions, authorizations by status
// - Webhook notifications by outcome
//
// All metrics are registered with Prometheus and scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub orders_deleted: IntCounter,
    pub order_items_removed: IntCounter,

    pub payment_sessions_created: IntCounter,
    pub payments_processed: IntCounterVec,
    pub webhook_notifications: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_deleted = IntCounter::new("orders_deleted_total", "Total orders deleted")?;
        registry.register(Box::new(orders_deleted.clone()))?;

        let order_items_removed = IntCounter::new(
            "order_items_removed_total",
            "Total order lines removed with stock restored",
        )?;
        registry.register(Box::new(order_items_removed.clone()))?;

        let payment_sessions_created = IntCounter::new(
            "payment_sessions_created_total",
            "Total payment sessions issued",
        )?;
        registry.register(Box::new(payment_sessions_created.clone()))?;

        let payments_processed = IntCounterVec::new(
            Opts::new("payments_processed_total", "Card authorizations by final status"),
            &["status"],
        )?;
        registry.register(Box::new(payments_processed.clone()))?;

        let webhook_notifications = IntCounterVec::new(
            Opts::new("webhook_notifications_total", "Gateway notifications by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(webhook_notifications.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_deleted,
            order_items_removed,
            payment_sessions_created,
            payments_processed,
            webhook_notifications,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_order_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.orders_created.inc();
        metrics.orders_created.inc();
        metrics.orders_deleted.inc();

        let gathered = metrics.registry.gather();
        let created = gathered
            .iter()
            .find(|m| m.name() == "orders_created_total")
            .unwrap();
        assert_eq!(created.metric[0].counter.value, Some(2.0));
    }

    #[test]
    fn test_payment_status_labels() {
        let metrics = Metrics::new().unwrap();
        metrics.payments_processed.with_label_values(&["APPROVED"]).inc();
        metrics.payments_processed.with_label_values(&["DECLINED"]).inc();
        metrics.payments_processed.with_label_values(&["APPROVED"]).inc();

        let gathered = metrics.registry.gather();
        let processed = gathered
            .iter()
            .find(|m| m.name() == "payments_processed_total")
            .unwrap();
        assert_eq!(processed.metric.len(), 2); // Two status labels
    }

    #[test]
    fn test_render_text_format() {
        let metrics = Metrics::new().unwrap();
        metrics.payment_sessions_created.inc();
        let text = metrics.render().unwrap();
        assert!(text.contains("payment_sessions_created_total"));
    }
}
