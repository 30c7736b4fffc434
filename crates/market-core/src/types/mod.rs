mod event;
mod order;

pub use event::{CanonicalEvent, EventCategory};
pub use order::{OrderRecord, OrderStatus, OrderUpsert};
