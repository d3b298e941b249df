//! Enumerations shared by entities, services and the wire format.

pub mod method;
pub mod status;

pub use method::{ItemType, MethodType, OperationType, ReplenishmentSystem};
pub use status::{QuoteStatus, SalesOrderStatus, SalesRfqStatus};
