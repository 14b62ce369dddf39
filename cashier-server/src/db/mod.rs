//! Database Module
//!
//! 嵌入式 SurrealDB：生产用 RocksDB 引擎，测试用内存引擎。

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "cashier";
const DATABASE: &str = "cashier";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// In-memory database for tests
    pub async fn new_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        Self::define_schema(&db).await?;
        tracing::info!("Database ready (namespace={}, db={})", NAMESPACE, DATABASE);
        Ok(Self { db })
    }

    /// 定义幂等 schema：唯一索引保证业务不变量
    ///
    /// - staff.email 唯一 (登录按小写邮箱查找)
    /// - order.order_number 唯一 (桌台通过它引用订单)
    /// - revoked_token.token 唯一 (同一令牌至多一行)
    /// - dining_table.table_name 唯一
    async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query(
            "
            DEFINE INDEX IF NOT EXISTS staff_email ON TABLE staff COLUMNS email UNIQUE;
            DEFINE INDEX IF NOT EXISTS order_number ON TABLE order COLUMNS order_number UNIQUE;
            DEFINE INDEX IF NOT EXISTS revoked_token_token ON TABLE revoked_token COLUMNS token UNIQUE;
            DEFINE INDEX IF NOT EXISTS dining_table_name ON TABLE dining_table COLUMNS table_name UNIQUE;
            ",
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
        Ok(())
    }
}
