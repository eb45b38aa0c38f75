pub mod events;
pub mod pii;

pub use events::{OrderPlacedEvent, OrderStatusChangedEvent};
pub use pii::Masked;
