use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{FulfillmentStatus, Order};

/// Failures surfaced by an order store. Stock problems are reported from
/// inside the insert so that the check and the decrement share one
/// transactional boundary.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("order store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Persistence boundary for orders.
///
/// `insert` is atomic: it writes the order and decrements stock for every
/// line, or does neither. A conditional decrement that matches zero rows
/// aborts the whole insert with `InsufficientStock`, so a failed order can
/// never leave inventory partially consumed.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), OrderStoreError>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderStoreError>;

    /// All orders placed by one customer, newest first.
    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, OrderStoreError>;

    /// Every order in the system, newest first.
    async fn find_all(&self) -> Result<Vec<Order>, OrderStoreError>;

    /// Set the fulfillment status of an order. Returns the updated order,
    /// or `None` when no order has that id.
    async fn update_fulfillment_status(
        &self,
        order_id: Uuid,
        new_status: FulfillmentStatus,
    ) -> Result<Option<Order>, OrderStoreError>;
}
