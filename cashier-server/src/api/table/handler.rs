//! Dining Table API Handlers
//!
//! 桌台列表、订单查询、结账

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{OrderRepository, TableRepository};
use crate::utils::{AppError, AppResult, ok, ok_with_message};
use shared::{ApiResponse, OrderView, TableSummary, TableView};

/// tableId 查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableIdQuery {
    pub table_id: Option<String>,
}

impl TableIdQuery {
    fn require(&self) -> AppResult<&str> {
        match self.table_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(AppError::validation("Table ID is required")),
        }
    }
}

/// 结账请求体 (可省略)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub payment_method: Option<String>,
}

/// 桌台列表响应数据
#[derive(Debug, Serialize)]
pub struct TableListData {
    pub tables: Vec<TableView>,
}

/// 订单查询/结账响应数据
#[derive(Debug, Serialize)]
pub struct TableOrderData {
    pub order: Option<OrderView>,
    pub table: TableSummary,
}

/// GET /api/table - 全部桌台，按名称升序
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<TableListData>>> {
    let repo = TableRepository::new(state.db.clone());
    let tables = repo.find_all_sorted().await?;

    Ok(ok(TableListData {
        tables: tables.iter().map(|t| t.to_view()).collect(),
    }))
}

/// GET /api/table/order?tableId= - 桌台当前订单
///
/// 无订单引用与悬空引用都返回 200 + `order: null`，由消息区分；
/// 只有桌台本身不存在才是 404。
pub async fn order(
    State(state): State<ServerState>,
    Query(query): Query<TableIdQuery>,
) -> AppResult<Json<ApiResponse<TableOrderData>>> {
    let table_id = query.require()?;

    let tables = TableRepository::new(state.db.clone());
    let table = tables
        .find_by_id(table_id)
        .await?
        .ok_or_else(|| AppError::not_found("Table not found"))?;

    if !table.has_order() {
        return Ok(ok_with_message(
            TableOrderData {
                order: None,
                table: table.to_summary(),
            },
            "No order found for this table",
        ));
    }

    let orders = OrderRepository::new(state.db.clone());
    let order = orders.find_by_order_number(table.order_id.trim()).await?;

    match order {
        Some(order) => Ok(ok(TableOrderData {
            order: Some(order.to_view()),
            table: table.to_summary(),
        })),
        None => {
            tracing::warn!(
                table = %table.table_name,
                order_id = %table.order_id,
                "Table references a missing order"
            );
            Ok(ok_with_message(
                TableOrderData {
                    order: None,
                    table: table.to_summary(),
                },
                "Order record is missing for this table",
            ))
        }
    }
}

/// PATCH /api/table/settle?tableId= - 结账并释放桌台
pub async fn settle(
    State(state): State<ServerState>,
    Query(query): Query<TableIdQuery>,
    body: Option<Json<SettleRequest>>,
) -> AppResult<Json<ApiResponse<TableOrderData>>> {
    let table_id = query.require()?;
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let outcome = state
        .settlement
        .settle(table_id, req.payment_method.as_deref())
        .await?;

    Ok(ok_with_message(
        TableOrderData {
            order: Some(outcome.order.to_view()),
            table: outcome.table.to_summary(),
        },
        "Bill settled successfully",
    ))
}
