use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment lifecycle, tracked separately from fulfillment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Shipping/delivery lifecycle stage of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "pending",
            FulfillmentStatus::Processing => "processing",
            FulfillmentStatus::Shipped => "shipped",
            FulfillmentStatus::Delivered => "delivered",
            FulfillmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(FulfillmentStatus::Pending),
            "processing" => Some(FulfillmentStatus::Processing),
            "shipped" => Some(FulfillmentStatus::Shipped),
            "delivered" => Some(FulfillmentStatus::Delivered),
            "cancelled" => Some(FulfillmentStatus::Cancelled),
            _ => None,
        }
    }
}

/// Delivery address captured at checkout. City and postal code are optional;
/// street, state and a contact phone are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: Option<String>,
    pub state: String,
    pub postal_code: Option<String>,
    pub phone: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), String> {
        if self.street.trim().is_empty() {
            return Err("shipping address requires a street".to_string());
        }
        if self.state.trim().is_empty() {
            return Err("shipping address requires a state".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("shipping address requires a contact phone".to_string());
        }
        Ok(())
    }
}

/// The single source of truth for a customer's purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Human-readable code quoted in confirmations, e.g. `PP-7K2M9QXA`
    pub reference: String,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_kobo: i64,
    pub discount_kobo: i64,
    pub currency: String,
    pub shipping_address: ShippingAddress,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        customer_id: String,
        customer_name: Option<String>,
        customer_email: Option<String>,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
    ) -> Self {
        let now = Utc::now();
        let total_kobo = items.iter().map(|item| item.line_total_kobo).sum();
        let discount_kobo = items.iter().map(|item| item.discount_kobo).sum();
        Self {
            id: Uuid::new_v4(),
            reference: generate_reference(),
            customer_id,
            customer_name,
            customer_email,
            items,
            total_kobo,
            discount_kobo,
            currency: "NGN".to_string(),
            shipping_address,
            payment_status: PaymentStatus::Pending,
            fulfillment_status: FulfillmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the fulfillment status; payment status, totals and line
    /// items are never touched by status updates.
    pub fn update_fulfillment_status(&mut self, new_status: FulfillmentStatus) {
        self.fulfillment_status = new_status;
        self.updated_at = Utc::now();
    }
}

/// An individual product line within an order. The unit price is the
/// undiscounted catalog price captured at purchase time; the bulk discount
/// is tracked separately and already netted into `line_total_kobo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_kobo: i64,
    pub discount_kobo: i64,
    pub line_total_kobo: i64,
}

impl OrderItem {
    pub fn new(
        product_id: Uuid,
        product_name: String,
        quantity: u32,
        unit_price_kobo: i64,
        discount_kobo: i64,
        line_total_kobo: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            product_name,
            quantity,
            unit_price_kobo,
            discount_kobo,
            line_total_kobo,
        }
    }
}

// 0/O and 1/I are excluded so codes survive being read over the phone.
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const REFERENCE_LENGTH: usize = 8;

/// Generate a short order reference like `PP-7K2M9QXA`.
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..REFERENCE_LENGTH)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("PP-{}", code)
}
