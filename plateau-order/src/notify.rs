use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use plateau_shared::events::{OrderPlacedEvent, OrderStatusChangedEvent};
use plateau_shared::pii::Masked;

use crate::models::Order;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel error: {0}")]
    Channel(String),
}

/// Outbound customer notifications. Implementations deliver confirmation
/// and status-change messages; callers treat delivery as best-effort and
/// must not block order processing on it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn order_confirmation(&self, order: &Order) -> Result<(), NotifyError>;

    async fn status_update(&self, order: &Order) -> Result<(), NotifyError>;
}

/// Notifier that writes structured events to the log instead of an external
/// channel. Stands in for a mail/SMS provider in development.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn order_confirmation(&self, order: &Order) -> Result<(), NotifyError> {
        let event = OrderPlacedEvent {
            order_id: order.id,
            reference: order.reference.clone(),
            customer_id: order.customer_id.clone(),
            total_kobo: order.total_kobo,
            discount_kobo: order.discount_kobo,
            item_count: order.items.len(),
            placed_at: order.created_at.timestamp(),
        };
        let payload = serde_json::to_string(&event)
            .map_err(|e| NotifyError::Channel(e.to_string()))?;
        let contact = Masked::from(order.customer_email.clone().unwrap_or_default());
        info!(reference = %order.reference, contact = %contact, "order confirmation: {}", payload);
        Ok(())
    }

    async fn status_update(&self, order: &Order) -> Result<(), NotifyError> {
        let event = OrderStatusChangedEvent {
            order_id: order.id,
            reference: order.reference.clone(),
            customer_id: order.customer_id.clone(),
            fulfillment_status: order.fulfillment_status.as_str().to_string(),
            changed_at: order.updated_at.timestamp(),
        };
        let payload = serde_json::to_string(&event)
            .map_err(|e| NotifyError::Channel(e.to_string()))?;
        let contact = Masked::from(order.customer_email.clone().unwrap_or_default());
        info!(reference = %order.reference, contact = %contact, "order status update: {}", payload);
        Ok(())
    }
}
