//! 线上视图类型与桌台状态机
//!
//! 服务端的持久化模型 (cashier-server/src/db/models) 序列化为这里定义的
//! 线上形态 (camelCase)，客户端直接反序列化这些视图。
//!
//! 核心是 [`TableStatus`]：桌台占用状态由 `(order_id, session_pin)` 派生，
//! 而不是冗余存储一个布尔标志。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 桌台占用状态 (派生，不存储)
///
/// 状态转换：
///
/// ```text
/// Available --pin issued (external)--> PinIssued
/// PinIssued --order created (external)--> Occupied
/// Available --order created (external)--> Occupied
/// Occupied  --settlement--> Available
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// 无订单、无 PIN
    Available,
    /// 已发 PIN，顾客自助会话开始，尚无订单
    PinIssued,
    /// 已有订单
    Occupied,
}

impl TableStatus {
    /// 由 `(order_id, session_pin)` 派生状态
    ///
    /// 订单引用优先于 PIN：两者同时存在时桌台算 Occupied。
    pub fn derive(order_id: &str, session_pin: &str) -> Self {
        if !order_id.trim().is_empty() {
            TableStatus::Occupied
        } else if !session_pin.trim().is_empty() {
            TableStatus::PinIssued
        } else {
            TableStatus::Available
        }
    }

    /// 桌台是否可用 (仅 Available 为可用)
    pub fn is_available(&self) -> bool {
        matches!(self, TableStatus::Available)
    }
}

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

/// 令牌主体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Staff,
    User,
}

/// 桌台线上视图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: String,
    pub table_name: String,
    pub pax: i32,
    /// 匹配 Order.orderNumber 的业务引用，空串表示无订单
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub session_pin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// 派生状态
    pub status: TableStatus,
    /// 派生可用标志 (保留给既有前端契约)
    pub is_available: bool,
}

impl TableView {
    /// 重新计算派生字段，保证 `status`/`is_available` 与存储字段一致
    pub fn recompute_status(&mut self) {
        self.status = TableStatus::derive(&self.order_id, &self.session_pin);
        self.is_available = self.status.is_available();
    }
}

/// 订单详情响应中附带的桌台投影
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub id: String,
    pub table_name: String,
    pub is_available: bool,
}

/// 订单行项目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub item_id: String,
    pub item_name: String,
    #[serde(default)]
    pub item_image: String,
    pub quantity: i32,
    pub price: f64,
    pub actual_price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub selected_modifiers: Vec<serde_json::Value>,
    pub item_total: f64,
}

/// 订单线上视图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub restaurant_code: String,
    pub order_number: String,
    pub table_id: String,
    pub table_name: String,
    pub items: Vec<OrderItemView>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub order_status: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
    pub bill_is_settle: bool,
}

/// 员工线上视图 (不含密码)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffView {
    pub id: String,
    pub staff_name: String,
    pub email: String,
    pub role: i32,
    pub mobile_number: String,
    pub address: String,
    pub nic: String,
    #[serde(default)]
    pub profile_image_url: String,
    pub is_active: bool,
}
