use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use plateau_catalog::{quote_line, CatalogRepository, CatalogStoreError};

use crate::models::{FulfillmentStatus, Order, OrderItem, ShippingAddress};
use crate::notify::Notifier;
use crate::repository::{OrderRepository, OrderStoreError};

/// Authenticated identity on whose behalf an operation runs. The HTTP
/// layer builds this from verified token claims; the service trusts it.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub admin: bool,
}

/// One requested line of a checkout cart. Quantity is kept wide and signed
/// here so that nonsense values reach validation instead of failing at the
/// parsing boundary.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("{0}")]
    Forbidden(String),

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CatalogStoreError> for OrderError {
    fn from(err: CatalogStoreError) -> Self {
        match err {
            CatalogStoreError::Backend(e) => OrderError::Storage(e),
        }
    }
}

impl From<OrderStoreError> for OrderError {
    fn from(err: OrderStoreError) -> Self {
        match err {
            OrderStoreError::ProductNotFound(id) => OrderError::ProductNotFound(id),
            OrderStoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            OrderStoreError::Backend(e) => OrderError::Storage(e),
        }
    }
}

/// Prices carts, persists orders and drives the fulfillment lifecycle.
/// Catalog reads, order persistence and customer notification are injected
/// so the engine runs identically against Postgres or the in-memory store.
pub struct OrderService {
    catalog: Arc<dyn CatalogRepository>,
    orders: Arc<dyn OrderRepository>,
    notifier: Arc<dyn Notifier>,
}

impl OrderService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            orders,
            notifier,
        }
    }

    /// Price and place an order.
    ///
    /// Every line is priced against the live catalog with the largest
    /// qualifying bulk tier. Persisting the order and decrementing stock
    /// happen in one transactional step, so a rejected order never consumes
    /// inventory. The confirmation notice is dispatched after commit and
    /// never blocks or fails the order.
    pub async fn create_order(
        &self,
        caller: &Caller,
        lines: &[CartLine],
        shipping_address: ShippingAddress,
    ) -> Result<Order, OrderError> {
        // 1. Validate the cart shape before touching the catalog.
        if lines.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        shipping_address.validate().map_err(OrderError::Validation)?;

        // 2. Price each line. Stock is screened here for early feedback;
        //    the store's conditional decrement remains the authoritative
        //    check under concurrency.
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let quantity = u32::try_from(line.quantity).ok().filter(|q| *q >= 1).ok_or_else(
                || {
                    OrderError::Validation(format!(
                        "quantity for product {} must be at least 1",
                        line.product_id
                    ))
                },
            )?;
            let product = self
                .catalog
                .get_product(line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(line.product_id))?;
            if product.stock < i64::from(quantity) {
                return Err(OrderError::InsufficientStock {
                    product_id: product.id,
                    requested: i64::from(quantity),
                    available: product.stock,
                });
            }
            let quote = quote_line(&product, quantity);
            items.push(OrderItem::new(
                product.id,
                product.name.clone(),
                quantity,
                quote.unit_price_kobo,
                quote.discount_kobo,
                quote.line_total_kobo,
            ));
        }

        // 3. Persist. The insert writes the order and decrements stock for
        //    every line atomically.
        let order = Order::new(
            caller.id.clone(),
            caller.name.clone(),
            caller.email.clone(),
            items,
            shipping_address,
        );
        self.orders.insert(&order).await?;

        // 4. Fire-and-forget confirmation.
        self.dispatch_confirmation(order.clone());

        Ok(order)
    }

    /// Fetch a single order. Customers can only read their own orders;
    /// an admin caller can read any.
    pub async fn get_order(&self, caller: &Caller, order_id: Uuid) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if !caller.admin && order.customer_id != caller.id {
            return Err(OrderError::Forbidden(
                "You do not have access to this order".to_string(),
            ));
        }
        Ok(order)
    }

    /// The caller's own order history, newest first.
    pub async fn list_orders(&self, caller: &Caller) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_by_customer(&caller.id).await?)
    }

    /// Every order in the system, newest first. Admin capability required.
    pub async fn list_all_orders(&self, caller: &Caller) -> Result<Vec<Order>, OrderError> {
        if !caller.admin {
            return Err(OrderError::Forbidden("Admin access required".to_string()));
        }
        Ok(self.orders.find_all().await?)
    }

    /// Move an order to a new fulfillment status. The status string must
    /// name a known stage; payment state and order contents are never
    /// touched. Admin capability required.
    pub async fn update_order_status(
        &self,
        caller: &Caller,
        order_id: Uuid,
        status: &str,
    ) -> Result<Order, OrderError> {
        if !caller.admin {
            return Err(OrderError::Forbidden("Admin access required".to_string()));
        }
        let new_status = FulfillmentStatus::parse(status)
            .ok_or_else(|| OrderError::InvalidStatus(status.to_string()))?;

        let order = self
            .orders
            .update_fulfillment_status(order_id, new_status)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        self.dispatch_status_update(order.clone());

        Ok(order)
    }

    fn dispatch_confirmation(&self, order: Order) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.order_confirmation(&order).await {
                warn!(reference = %order.reference, error = %e, "order confirmation not delivered");
            }
        });
    }

    fn dispatch_status_update(&self, order: Order) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.status_update(&order).await {
                warn!(reference = %order.reference, error = %e, "status notice not delivered");
            }
        });
    }
}
