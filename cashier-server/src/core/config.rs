use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/cashier | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SECRET_KEY / JWT_SECRET | (不安全默认值) | JWT 签名密钥 |
/// | LOG_TO_FILE | false | 是否写入滚动日志文件 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/cashier HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 是否写入滚动日志文件 (work_dir/logs)
    pub log_to_file: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/cashier".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_to_file: std::env::var("LOG_TO_FILE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径: work_dir/database/cashier.db
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir)
            .join("database")
            .join("cashier.db")
    }

    /// 日志目录: work_dir/logs
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
