//! Order Repository
//!
//! 订单由外部订餐服务创建；这里只有按编号查询和结账的条件更新。

use super::{BaseRepository, RepoResult};
use crate::db::models::Order;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by business number (table.order_id references this)
    pub async fn find_by_order_number(&self, order_number: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE order_number = $num LIMIT 1")
            .bind(("num", order_number.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// 结账条件更新 (compare-and-set)
    ///
    /// 只在 `bill_is_settle = false` 时生效，返回更新后的订单；
    /// 返回 `None` 表示订单已结 (零行受影响)。两个并发结账调用
    /// 至多一个能取到非 None。
    pub async fn settle_if_open(
        &self,
        order_number: &str,
        payment_method: Option<&str>,
    ) -> RepoResult<Option<Order>> {
        let mut query = String::from(
            "UPDATE order SET bill_is_settle = true, payment_status = 'paid'",
        );
        if payment_method.is_some() {
            query.push_str(", payment_method = $method");
        }
        query.push_str(" WHERE order_number = $num AND bill_is_settle = false RETURN AFTER");

        let mut q = self
            .base
            .db()
            .query(query)
            .bind(("num", order_number.to_string()));
        if let Some(method) = payment_method {
            q = q.bind(("method", method.to_string()));
        }

        let mut result = q.await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Create an order (seed/test fixture only, no API surface)
    pub async fn create(&self, order: Order) -> RepoResult<Option<Order>> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        Ok(created)
    }
}
