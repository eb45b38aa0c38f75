use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use plateau_order::models::{
    FulfillmentStatus, Order, OrderItem, PaymentStatus, ShippingAddress,
};
use plateau_order::repository::{OrderRepository, OrderStoreError};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    reference: String,
    customer_id: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    total_kobo: i64,
    discount_kobo: i64,
    currency: String,
    shipping_street: String,
    shipping_city: Option<String>,
    shipping_state: String,
    shipping_postal_code: Option<String>,
    shipping_phone: String,
    payment_status: String,
    fulfillment_status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    unit_price_kobo: i64,
    discount_kobo: i64,
    line_total_kobo: i64,
}

fn backend(err: sqlx::Error) -> OrderStoreError {
    OrderStoreError::Backend(Box::new(err))
}

fn assemble(row: OrderRow, item_rows: Vec<OrderItemRow>) -> Result<Order, OrderStoreError> {
    let payment_status = PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
        OrderStoreError::Backend(
            format!("unknown payment status in storage: {}", row.payment_status).into(),
        )
    })?;
    let fulfillment_status =
        FulfillmentStatus::parse(&row.fulfillment_status).ok_or_else(|| {
            OrderStoreError::Backend(
                format!(
                    "unknown fulfillment status in storage: {}",
                    row.fulfillment_status
                )
                .into(),
            )
        })?;

    let items = item_rows
        .into_iter()
        .map(|item| OrderItem {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity as u32,
            unit_price_kobo: item.unit_price_kobo,
            discount_kobo: item.discount_kobo,
            line_total_kobo: item.line_total_kobo,
        })
        .collect();

    Ok(Order {
        id: row.id,
        reference: row.reference,
        customer_id: row.customer_id,
        customer_name: row.customer_name,
        customer_email: row.customer_email,
        items,
        total_kobo: row.total_kobo,
        discount_kobo: row.discount_kobo,
        currency: row.currency,
        shipping_address: ShippingAddress {
            street: row.shipping_street,
            city: row.shipping_city,
            state: row.shipping_state,
            postal_code: row.shipping_postal_code,
            phone: row.shipping_phone,
        },
        payment_status,
        fulfillment_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl PgOrderRepository {
    async fn load_order(&self, id: Uuid) -> Result<Option<Order>, OrderStoreError> {
        let order_row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, reference, customer_id, customer_name, customer_email, total_kobo, \
                    discount_kobo, currency, shipping_street, shipping_city, shipping_state, \
                    shipping_postal_code, shipping_phone, payment_status, fulfillment_status, \
                    created_at, updated_at \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = order_row else {
            return Ok(None);
        };

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, product_id, product_name, quantity, unit_price_kobo, discount_kobo, \
                    line_total_kobo \
             FROM order_items WHERE order_id = $1 ORDER BY line_index",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        assemble(row, item_rows).map(Some)
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderStoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query(
            "INSERT INTO orders \
             (id, reference, customer_id, customer_name, customer_email, total_kobo, \
              discount_kobo, currency, shipping_street, shipping_city, shipping_state, \
              shipping_postal_code, shipping_phone, payment_status, fulfillment_status, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(order.id)
        .bind(&order.reference)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.total_kobo)
        .bind(order.discount_kobo)
        .bind(&order.currency)
        .bind(&order.shipping_address.street)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.postal_code)
        .bind(&order.shipping_address.phone)
        .bind(order.payment_status.as_str())
        .bind(order.fulfillment_status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        for (index, item) in order.items.iter().enumerate() {
            // Conditional decrement: matching zero rows means the product
            // is missing or the remaining stock cannot cover this line, and
            // dropping the transaction rolls back everything so far.
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $1, updated_at = NOW() \
                 WHERE id = $2 AND stock >= $1",
            )
            .bind(i64::from(item.quantity))
            .bind(item.product_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

            if updated.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                        .bind(item.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(backend)?;

                return Err(match available {
                    Some(available) => OrderStoreError::InsufficientStock {
                        product_id: item.product_id,
                        requested: i64::from(item.quantity),
                        available,
                    },
                    None => OrderStoreError::ProductNotFound(item.product_id),
                });
            }

            sqlx::query(
                "INSERT INTO order_items \
                 (id, order_id, line_index, product_id, product_name, quantity, \
                  unit_price_kobo, discount_kobo, line_total_kobo) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(item.id)
            .bind(order.id)
            .bind(index as i32)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.unit_price_kobo)
            .bind(item.discount_kobo)
            .bind(item.line_total_kobo)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;

        Ok(())
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderStoreError> {
        self.load_order(order_id).await
    }

    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, OrderStoreError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = self.load_order(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn find_all(&self) -> Result<Vec<Order>, OrderStoreError> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM orders ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = self.load_order(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn update_fulfillment_status(
        &self,
        order_id: Uuid,
        new_status: FulfillmentStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        let result = sqlx::query(
            "UPDATE orders SET fulfillment_status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(new_status.as_str())
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.load_order(order_id).await
    }
}
