use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plateau_order::models::{FulfillmentStatus, Order, PaymentStatus, ShippingAddress};
use plateau_order::CartLine;
use plateau_shared::pii::Masked;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddressRequest,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
}

impl ShippingAddressRequest {
    fn into_address(self) -> ShippingAddress {
        // Blank required fields are caught by domain validation.
        ShippingAddress {
            street: self.street.unwrap_or_default(),
            city: self.city,
            state: self.state.unwrap_or_default(),
            postal_code: self.zip_code,
            phone: self.phone.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<Masked<String>>,
    pub items: Vec<OrderItemResponse>,
    /// Grand total in kobo, bulk discounts already netted off
    pub total_amount: i64,
    /// Total bulk discount in kobo
    pub discount: i64,
    pub currency: String,
    pub shipping_address: ShippingAddressResponse,
    pub payment_status: PaymentStatus,
    pub order_status: FulfillmentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    /// Undiscounted catalog unit price at purchase time, in kobo
    pub unit_price: i64,
    pub discount: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressResponse {
    pub street: String,
    pub city: Option<String>,
    pub state: String,
    pub zip_code: Option<String>,
    pub phone: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            reference: order.reference,
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            customer_email: order.customer_email.map(Masked::from),
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price_kobo,
                    discount: item.discount_kobo,
                    line_total: item.line_total_kobo,
                })
                .collect(),
            total_amount: order.total_kobo,
            discount: order.discount_kobo,
            currency: order.currency,
            shipping_address: ShippingAddressResponse {
                street: order.shipping_address.street,
                city: order.shipping_address.city,
                state: order.shipping_address.state,
                zip_code: order.shipping_address.postal_code,
                phone: order.shipping_address.phone,
            },
            payment_status: order.payment_status,
            order_status: order.fulfillment_status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/orders
/// Price the cart, persist the order and decrement stock atomically
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let lines: Vec<CartLine> = request
        .items
        .iter()
        .map(|item| CartLine {
            product_id: item.product,
            quantity: item.quantity,
        })
        .collect();
    let address = request.shipping_address.into_address();

    let order = state
        .orders
        .create_order(&claims.caller(), &lines, address)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /api/orders/:id
/// Fetch one order; customers only see their own
pub async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.get_order(&claims.caller(), order_id).await?;
    Ok(Json(order.into()))
}

/// GET /api/orders
/// The caller's order history, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.orders.list_orders(&claims.caller()).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/admin/all
/// Every order in the system, newest first (admin only)
pub async fn admin_list_all_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.orders.list_all_orders(&claims.caller()).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// PUT /api/orders/admin/orders/:id
/// Move an order to a new fulfillment status (admin only)
pub async fn admin_update_order_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
    payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let order = state
        .orders
        .update_order_status(&claims.caller(), order_id, &request.status)
        .await?;

    Ok(Json(order.into()))
}
