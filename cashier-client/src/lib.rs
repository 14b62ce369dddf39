//! Cashier Client - 收银终端客户端核心
//!
//! 提供三块能力：
//!
//! - **REST 客户端** (`client`): 登录/登出、桌台列表、订单查询、结账
//! - **推送通道** (`channel`): 连接生命周期与有限次自动重连
//! - **缓存对账** (`reconciler`): 推送事件的乐观更新 + 延迟权威刷新

pub mod channel;
pub mod client;
pub mod error;
pub mod reconciler;
pub mod session;

pub use channel::{EventChannel, EventTransport, MemoryTransport};
pub use client::{CashierApi, HttpCashierClient, LoginData, TableOrderData};
pub use error::{ClientError, ClientResult};
pub use reconciler::{QueueRefetchSink, RefetchRequest, RefetchSink, TableReconciler};
pub use session::{StaffSession, parse_jwt_exp};

// Re-export shared types for convenience
pub use shared::{ApiResponse, CashierEvent, ChannelStatus, TableStatus, TableView};
