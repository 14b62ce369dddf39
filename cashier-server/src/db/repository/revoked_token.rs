//! Revoked Token Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::RevokedToken;
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "revoked_token";

#[derive(Clone)]
pub struct RevokedTokenRepository {
    base: BaseRepository,
}

impl RevokedTokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 精确匹配令牌串是否在吊销表中
    pub async fn exists(&self, token: &str) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            // $token 是 SurrealDB 的保护变量，绑定名必须避开
            .query("SELECT token FROM revoked_token WHERE token = $tok LIMIT 1")
            .bind(("tok", token.to_string()))
            .await?;
        let rows: Vec<serde_json::Value> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    /// 插入吊销记录
    ///
    /// 重复插入 (令牌已在表中，唯一索引冲突) 视为已吊销，不算失败。
    pub async fn insert(&self, record: RevokedToken) -> RepoResult<()> {
        let token = record.token.clone();
        let created: Result<Option<RevokedToken>, surrealdb::Error> =
            self.base.db().create(TABLE).content(record).await;
        match created {
            Ok(_) => Ok(()),
            Err(e) => {
                if self.exists(&token).await? {
                    Ok(())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// 删除所有已过期的吊销记录，返回清除数量
    pub async fn purge_expired(&self) -> RepoResult<usize> {
        let now = Utc::now();
        let mut result = self
            .base
            .db()
            .query("DELETE revoked_token WHERE expires_at < $now RETURN BEFORE")
            .bind(("now", now))
            .await?;
        let purged: Vec<RevokedToken> = result.take(0)?;
        Ok(purged.len())
    }
}
