//! 员工会话
//!
//! 持有登录返回的令牌与员工信息，过期时间直接从 JWT payload 解出，
//! 客户端不验证签名 (那是服务端的事)，只用 exp 做本地预判。

use shared::StaffView;

/// 当前登录会话
#[derive(Debug, Clone)]
pub struct StaffSession {
    pub staff: StaffView,
    pub token: String,
    /// 令牌过期时间 (Unix timestamp)，payload 不可解析时为 None
    pub expires_at: Option<u64>,
}

impl StaffSession {
    pub fn new(staff: StaffView, token: String) -> Self {
        let expires_at = parse_jwt_exp(&token);
        Self {
            staff,
            token,
            expires_at,
        }
    }

    /// 令牌是否已过期 (解析失败视为已过期，强制重新登录)
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(exp) => now >= exp,
            None => true,
        }
    }
}

/// 从 JWT token 中解析过期时间 (Unix timestamp)
pub fn parse_jwt_exp(token: &str) -> Option<u64> {
    // JWT 格式: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    // 解码 payload (base64url)
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload_str = String::from_utf8(payload_bytes).ok()?;

    // 解析 JSON 提取 exp 字段
    let payload: serde_json::Value = serde_json::from_str(&payload_str).ok()?;
    payload.get("exp")?.as_u64()
}
