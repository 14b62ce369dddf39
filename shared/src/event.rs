//! 实时推送事件载荷
//!
//! 事件由外部订餐服务经推送通道下发，本代码库只消费不产生。
//! 载荷形态与既有前端契约保持一致 (camelCase)。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `pin_generated` 事件：顾客自助会话开始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinGeneratedPayload {
    pub table_id: String,
    pub table_name: String,
    pub session_pin: String,
    #[serde(default)]
    pub customer_mobile_number: String,
}

/// `order_created` 事件：订单已创建/更新并挂到桌台
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedPayload {
    pub table_id: String,
    pub order_id: String,
    pub order_number: String,
    pub table_name: String,
    #[serde(default)]
    pub is_update: bool,
}

/// 收银端消费的事件集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CashierEvent {
    PinGenerated(PinGeneratedPayload),
    OrderCreated(OrderCreatedPayload),
}

impl CashierEvent {
    /// 事件涉及的桌台 ID
    pub fn table_id(&self) -> &str {
        match self {
            CashierEvent::PinGenerated(p) => &p.table_id,
            CashierEvent::OrderCreated(p) => &p.table_id,
        }
    }
}

/// 推送通道连接状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Connected,
    /// `retries_exhausted` 为 true 表示自动重连已放弃，
    /// 之后只接受手动 reconnect
    Disconnected { retries_exhausted: bool },
    ConnectionError { message: String },
}

/// 环形缓冲中保留的事件记录 (调试/展示用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentEvent {
    pub event: CashierEvent,
    pub received_at: DateTime<Utc>,
}
