//! 收银系统共享类型
//!
//! 这些类型在 cashier-server 和 cashier-client 之间共享：
//!
//! - [`response`]: 统一 API 响应信封
//! - [`models`]: 桌台/订单/员工的线上视图类型与桌台状态机
//! - [`event`]: 实时推送事件载荷 (pin_generated / order_created)

pub mod event;
pub mod models;
pub mod response;

pub use event::{CashierEvent, ChannelStatus, OrderCreatedPayload, PinGeneratedPayload, RecentEvent};
pub use models::{
    OrderItemView, OrderView, PaymentStatus, StaffView, TableStatus, TableSummary, TableView,
    UserType,
};
pub use response::ApiResponse;
