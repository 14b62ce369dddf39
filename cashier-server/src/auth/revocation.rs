//! 令牌吊销服务
//!
//! 登出写入吊销表；后台清扫任务定期删除已过期的记录，
//! 吊销表因此只保留 "仍在有效期内但已吊销" 的令牌，不会无界增长。

use chrono::{DateTime, TimeZone, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::auth::jwt::TOKEN_TTL_MINUTES;
use crate::db::models::RevokedToken;
use crate::db::repository::{RepoResult, RevokedTokenRepository};
use shared::UserType;

/// 清扫间隔
const SWEEP_INTERVAL_SECS: u64 = 60;

/// 令牌吊销服务
#[derive(Clone)]
pub struct RevocationService {
    repo: RevokedTokenRepository,
}

impl RevocationService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: RevokedTokenRepository::new(db),
        }
    }

    /// 令牌是否已吊销
    pub async fn is_revoked(&self, token: &str) -> RepoResult<bool> {
        self.repo.exists(token).await
    }

    /// 吊销一个令牌
    ///
    /// `exp` 为令牌的过期时间戳；缺失或非法时取 now + 12h 兜底。
    /// 重复吊销同一令牌不算失败。
    pub async fn revoke(
        &self,
        token: &str,
        user_id: &str,
        user_type: UserType,
        exp: Option<i64>,
        reason: &str,
    ) -> RepoResult<()> {
        let expires_at: DateTime<Utc> = exp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(TOKEN_TTL_MINUTES));

        self.repo
            .insert(RevokedToken {
                id: None,
                token: token.to_string(),
                user_id: user_id.to_string(),
                user_type,
                reason: reason.to_string(),
                expires_at,
            })
            .await
    }

    /// 清除已过期的吊销记录
    pub async fn purge_expired(&self) -> RepoResult<usize> {
        self.repo.purge_expired().await
    }

    /// 后台清扫循环，`shutdown` 取消时退出
    pub async fn run_sweep(self, shutdown: CancellationToken) {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        // 首个 tick 立即触发，先消费掉
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Revocation sweep stopped");
                    return;
                }
                _ = ticker.tick() => {
                    match self.purge_expired().await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(purged = n, "Purged expired revoked tokens"),
                        Err(e) => tracing::warn!(error = %e, "Revocation sweep failed"),
                    }
                }
            }
        }
    }
}
