//! 仓储层
//!
//! 每张表一个仓储，持有共享的数据库句柄做查询；
//! 业务状态机 (如结账) 在上层组合这些仓储。

pub mod dining_table;
pub mod order;
pub mod revoked_token;
pub mod staff;

pub use dining_table::TableRepository;
pub use order::OrderRepository;
pub use revoked_token::RevokedTokenRepository;
pub use staff::StaffRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// 仓储层错误
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("database failure: {0}")]
    Database(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

// ID 约定：全栈统一 "table:id" 字符串，用 surrealdb::RecordId 承载。
// 解析用 "dining_table:abc".parse()，构造用 RecordId::from_table_key，
// select/delete 直接传 RecordId。

/// 仓储共享的数据库句柄
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
