//! Database Models

pub mod dining_table;
pub mod order;
pub mod revoked_token;
pub mod serde_helpers;
pub mod staff;

pub use dining_table::DiningTable;
pub use order::{Order, OrderItem};
pub use revoked_token::RevokedToken;
pub use staff::{Staff, StaffId};
