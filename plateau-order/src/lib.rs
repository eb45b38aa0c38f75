pub mod memory;
pub mod models;
pub mod notify;
pub mod repository;
pub mod service;

pub use memory::MemoryStore;
pub use models::{FulfillmentStatus, Order, OrderItem, PaymentStatus, ShippingAddress};
pub use notify::{LogNotifier, Notifier};
pub use repository::{OrderRepository, OrderStoreError};
pub use service::{Caller, CartLine, OrderError, OrderService};
