//! Dining Table Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{TableStatus, TableSummary, TableView};
use surrealdb::RecordId;

/// 桌台实体
///
/// 占用状态不落库：由 `(order_id, session_pin)` 派生，见
/// [`TableStatus::derive`]。`order_id` 是匹配 `Order.order_number`
/// 的业务引用 (字符串，不是外键)，空串表示无订单。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub table_name: String,
    pub pax: i32,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub session_pin: String,
    #[serde(default)]
    pub pin_generated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub customer_id: Option<RecordId>,
}

impl DiningTable {
    /// 派生占用状态
    pub fn status(&self) -> TableStatus {
        TableStatus::derive(&self.order_id, &self.session_pin)
    }

    /// 桌台是否有订单引用
    pub fn has_order(&self) -> bool {
        !self.order_id.trim().is_empty()
    }

    /// 完整线上视图
    pub fn to_view(&self) -> TableView {
        let status = self.status();
        TableView {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            table_name: self.table_name.clone(),
            pax: self.pax,
            order_id: self.order_id.clone(),
            session_pin: self.session_pin.clone(),
            pin_generated_at: self.pin_generated_at,
            customer_id: self.customer_id.as_ref().map(|t| t.to_string()),
            status,
            is_available: status.is_available(),
        }
    }

    /// 订单响应中附带的投影
    pub fn to_summary(&self) -> TableSummary {
        TableSummary {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            table_name: self.table_name.clone(),
            is_available: self.status().is_available(),
        }
    }
}
