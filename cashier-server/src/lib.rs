//! Cashier Server - 餐厅收银终端服务
//!
//! # 架构概述
//!
//! 面向收银终端的独立服务，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 登录、令牌吊销
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **结账** (`settlement`): 订单结账与桌台释放状态机
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! cashier-server/src/
//! ├── core/          # 配置、状态、服务器启动
//! ├── auth/          # JWT 认证、令牌吊销
//! ├── api/           # HTTP 路由和处理器
//! ├── middleware/    # 请求日志中间件
//! ├── settlement/    # 结账状态迁移引擎
//! ├── db/            # 数据库层 (模型 + 仓储)
//! └── utils/         # 错误、响应、日志工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod settlement;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService, RevocationService};
pub use core::{Config, Server, ServerState};
pub use settlement::{SettlementEngine, SettlementError, SettlementOutcome};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 统一落到 target="security"，值按 Display 记录
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = %$value),*
        );
    };
}

/// 设置进程环境：加载 .env 并初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    if config.log_to_file {
        let log_dir = config.log_dir();
        init_logger_with_file(None, Some(&log_dir.to_string_lossy()));
    } else {
        init_logger();
    }

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______           __    _
  / ____/___ ______/ /_  (_)__  _____
 / /   / __ `/ ___/ __ \/ / _ \/ ___/
/ /___/ /_/ (__  ) / / / /  __/ /
\____/\__,_/____/_/ /_/_/\___/_/
    "#
    );
}
