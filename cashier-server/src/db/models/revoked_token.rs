//! Revoked Token Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UserType;
use surrealdb::RecordId;

/// 已吊销令牌
///
/// 登出时写入，过期后由后台清扫任务删除。`token` 有唯一索引：
/// 同一令牌至多一行，存在即拒绝。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub token: String,
    pub user_id: String,
    pub user_type: UserType,
    #[serde(default = "default_reason")]
    pub reason: String,
    pub expires_at: DateTime<Utc>,
}

fn default_reason() -> String {
    "logout".to_string()
}
