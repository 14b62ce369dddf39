//! Order Model
//!
//! 订单由外部订餐服务创建，本服务唯一的写入是结账
//! (`bill_is_settle = true`，条件更新见 OrderRepository::settle_if_open)。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{OrderItemView, OrderView, PaymentStatus};
use surrealdb::RecordId;

/// 订单行项目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
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

/// 订单实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub restaurant_code: String,
    /// 业务编号，唯一索引；桌台的 order_id 引用它
    pub order_number: String,
    #[serde(with = "serde_helpers::record_id")]
    pub table_id: RecordId,
    pub table_name: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default = "default_order_status")]
    pub order_status: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub bill_is_settle: bool,
}

fn default_payment_method() -> String {
    "cash".to_string()
}

fn default_order_status() -> String {
    "new".to_string()
}

impl Order {
    /// 线上视图
    pub fn to_view(&self) -> OrderView {
        OrderView {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            restaurant_code: self.restaurant_code.clone(),
            order_number: self.order_number.clone(),
            table_id: self.table_id.to_string(),
            table_name: self.table_name.clone(),
            items: self
                .items
                .iter()
                .map(|i| OrderItemView {
                    item_id: i.item_id.clone(),
                    item_name: i.item_name.clone(),
                    item_image: i.item_image.clone(),
                    quantity: i.quantity,
                    price: i.price,
                    actual_price: i.actual_price,
                    discount: i.discount,
                    selected_modifiers: i.selected_modifiers.clone(),
                    item_total: i.item_total,
                })
                .collect(),
            subtotal: self.subtotal,
            discount: self.discount,
            tax: self.tax,
            total: self.total,
            payment_method: self.payment_method.clone(),
            payment_status: self.payment_status,
            order_status: self.order_status.clone(),
            customer_phone: self.customer_phone.clone(),
            notes: self.notes.clone(),
            bill_is_settle: self.bill_is_settle,
        }
    }
}
