use uuid::Uuid;

/// Payload logged when an order is accepted and persisted.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderPlacedEvent {
    pub order_id: Uuid,
    pub reference: String,
    pub customer_id: String,
    pub total_kobo: i64,
    pub discount_kobo: i64,
    pub item_count: usize,
    pub placed_at: i64,
}

/// Payload logged when an administrator moves an order through fulfillment.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderStatusChangedEvent {
    pub order_id: Uuid,
    pub reference: String,
    pub customer_id: String,
    pub fulfillment_status: String,
    pub changed_at: i64,
}
