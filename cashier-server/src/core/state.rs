use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::auth::{JwtService, RevocationService};
use crate::core::Config;
use crate::db::DbService;
use crate::settlement::SettlementEngine;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | revocation | RevocationService | 令牌吊销存储 |
/// | settlement | SettlementEngine | 结账状态迁移引擎 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 令牌吊销存储
    pub revocation: RevocationService,
    /// 结账引擎
    pub settlement: SettlementEngine,
    /// 后台任务取消信号
    shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (work_dir/database/cashier.db) 与唯一索引
    /// 2. JWT 服务 (生产环境拒绝默认密钥)
    /// 3. 吊销存储与结账引擎
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        if config.is_production() && config.jwt.is_default_secret() {
            anyhow::bail!(
                "Refusing to start in production with the default JWT secret; \
                 set SECRET_KEY or JWT_SECRET"
            );
        }

        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;
        let db = db_service.db;

        Ok(Self::with_db(config.clone(), db))
    }

    /// 基于已初始化的数据库构造状态 (测试用内存库走这里)
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let revocation = RevocationService::new(db.clone());
        let settlement = SettlementEngine::new(db.clone());

        Self {
            config,
            db,
            jwt_service,
            revocation,
            settlement,
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 吊销表过期清理 (60 秒周期)
    pub fn start_background_tasks(&self) {
        let sweep = self.revocation.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            sweep.run_sweep(shutdown).await;
        });
    }

    /// 请求后台任务退出
    pub fn shutdown_background_tasks(&self) {
        self.shutdown.cancel();
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
