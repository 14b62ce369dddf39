//! JWT 令牌服务
//!
//! 处理 JWT 令牌的生成、验证和解析。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::UserType;
use thiserror::Error;

/// 历史遗留的不安全默认密钥
///
/// 仅为兼容旧部署保留；出现在生产环境视为部署配置错误，
/// 服务器会拒绝启动 (见 [`JwtConfig::is_default_secret`])。
pub const INSECURE_DEFAULT_SECRET: &str = "your-secret-key";

/// 令牌绝对有效期 (12 小时)
pub const TOKEN_TTL_MINUTES: i64 = 12 * 60;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: load_jwt_secret(),
            expiration_minutes: TOKEN_TTL_MINUTES,
        }
    }
}

impl JwtConfig {
    /// 是否仍在使用不安全默认密钥
    pub fn is_default_secret(&self) -> bool {
        self.secret == INSECURE_DEFAULT_SECRET
    }
}

/// 从环境变量加载 JWT 密钥
///
/// 优先 `SECRET_KEY`，其次 `JWT_SECRET`，都未设置时回退到
/// [`INSECURE_DEFAULT_SECRET`] 并打警告。
fn load_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("SECRET_KEY")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    tracing::warn!(
        "⚠️  SECRET_KEY/JWT_SECRET not set! Falling back to the insecure default key. \
         This is a deployment misconfiguration, not a valid production setup."
    );
    INSECURE_DEFAULT_SECRET.to_string()
}

/// 生成安全的随机密钥 (工具函数，供部署脚本/测试使用)
pub fn generate_secure_jwt_secret() -> Result<String, JwtError> {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let rng = SystemRandom::new();
    let mut key = String::with_capacity(64);

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        rng.fill(&mut byte).map_err(|_| {
            JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
        })?;
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(
            allowed_chars
                .chars()
                .nth(idx)
                .unwrap_or('x'),
        );
    }

    Ok(key)
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 主体 ID
    pub user_id: String,
    /// 显示名
    pub user_name: String,
    /// 数值角色
    pub role: i32,
    /// 主体类型
    pub user_type: UserType,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// 使用默认配置创建新的 JWT 服务
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为员工生成新令牌
    pub fn generate_token(
        &self,
        user_id: &str,
        user_name: &str,
        role: i32,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            role,
            user_type: UserType::Staff,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前员工上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求扩展供处理函数使用。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: i32,
    pub user_type: UserType,
    /// 令牌过期时间戳，登出时写入吊销表
    pub exp: i64,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            name: claims.user_name,
            role: claims.role,
            user_type: claims.user_type,
            exp: claims.exp,
        }
    }
}

/// 请求携带的原始令牌串 (吊销时需要精确令牌)
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);
