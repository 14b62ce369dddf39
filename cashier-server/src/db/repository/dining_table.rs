//! Dining Table Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::DiningTable;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct TableRepository {
    base: BaseRepository,
}

impl TableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All tables ordered by name ascending (lexicographic)
    pub async fn find_all_sorted(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table ORDER BY table_name ASC")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    ///
    /// 无法解析的 id 视为不存在 (返回 None)，交由调用方映射为 404。
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing: RecordId = match id.parse() {
            Ok(t) => t,
            Err(_) => return Ok(None),
        };
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// 释放桌台：清空订单引用与自助会话，派生状态回到 Available
    pub async fn release(&self, id: &RecordId) -> RepoResult<DiningTable> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET order_id = '', session_pin = '', \
                 pin_generated_at = NONE, customer_id = NONE RETURN AFTER",
            )
            .bind(("thing", id.clone()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        tables.into_iter().next().ok_or_else(|| {
            super::RepoError::NotFound(format!("Dining table {} not found", id))
        })
    }

    /// Create a table (seed/test fixture only, no API surface)
    pub async fn create(&self, table: DiningTable) -> RepoResult<Option<DiningTable>> {
        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        Ok(created)
    }
}
