//! 结账状态迁移引擎
//!
//! 系统唯一的核心状态机：把一笔订单标记为已付，并把它占用的桌台
//! 释放回可用状态。
//!
//! # 状态
//!
//! 桌台 (派生，见 [`shared::TableStatus`]):
//! `Available → PinIssued → Occupied → Available`
//! (前两个迁移由外部订餐服务触发，本引擎只负责最后一个。)
//!
//! 订单: `Open (bill_is_settle=false) → Settled (bill_is_settle=true, 终态)`
//!
//! # 并发
//!
//! 订单侧的写入是单条条件更新 (`WHERE bill_is_settle = false`)：
//! 两个并发结账调用至多一个成功，另一个得到 [`SettlementError::AlreadySettled`]。
//! 订单更新与桌台释放是两条语句；若释放失败，留下的是 "已结订单仍挂在
//! 桌台上" 的可恢复状态——下一次结账在已结检查处失败，桌台由人工释放。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::{DiningTable, Order};
use crate::db::repository::{OrderRepository, RepoError, TableRepository};
use crate::utils::AppError;

/// 结账失败分类
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Table not found")]
    TableNotFound,

    #[error("No order found for this table")]
    NoOrderForTable,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Order is already settled")]
    AlreadySettled,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SettlementError> for AppError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::TableNotFound => AppError::not_found("Table not found"),
            SettlementError::NoOrderForTable => {
                AppError::validation("No order found for this table")
            }
            SettlementError::OrderNotFound => AppError::not_found("Order not found"),
            SettlementError::AlreadySettled => AppError::validation("Order is already settled"),
            SettlementError::Repo(e) => e.into(),
        }
    }
}

/// 结账结果：更新后的订单与释放后的桌台
#[derive(Debug)]
pub struct SettlementOutcome {
    pub order: Order,
    pub table: DiningTable,
}

/// 结账状态迁移引擎
#[derive(Clone)]
pub struct SettlementEngine {
    tables: TableRepository,
    orders: OrderRepository,
}

impl SettlementEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            tables: TableRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    /// 结账：`settle(table_id, payment_method?)`
    ///
    /// 1. 桌台不存在 → `TableNotFound`
    /// 2. 桌台无订单引用 → `NoOrderForTable`
    /// 3. 引用悬空 (无匹配订单) → `OrderNotFound`
    /// 4. 条件更新订单 (`bill_is_settle=true, payment_status=paid`,
    ///    指定了支付方式则覆盖)；零行受影响 → `AlreadySettled`
    /// 5. 释放桌台 (清空 order_id/session_pin/pin_generated_at/customer_id)
    pub async fn settle(
        &self,
        table_id: &str,
        payment_method: Option<&str>,
    ) -> Result<SettlementOutcome, SettlementError> {
        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .ok_or(SettlementError::TableNotFound)?;

        if !table.has_order() {
            return Err(SettlementError::NoOrderForTable);
        }
        let order_number = table.order_id.trim().to_string();

        // 先确认订单存在：悬空引用 (404) 与已结订单 (400) 要区分开
        self.orders
            .find_by_order_number(&order_number)
            .await?
            .ok_or(SettlementError::OrderNotFound)?;

        let order = self
            .orders
            .settle_if_open(&order_number, payment_method)
            .await?
            .ok_or(SettlementError::AlreadySettled)?;

        let table_ref = table.id.clone().ok_or_else(|| {
            SettlementError::Repo(RepoError::Database(
                "Table record has no id".to_string(),
            ))
        })?;
        let table = self.tables.release(&table_ref).await?;

        tracing::info!(
            order_number = %order.order_number,
            table = %table.table_name,
            payment_method = %order.payment_method,
            "Order settled and table released"
        );

        Ok(SettlementOutcome { order, table })
    }
}
