//! Staff Authentication Handlers
//!
//! Handles login and logout (token revocation)

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::{BearerToken, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::StaffRepository;
use crate::utils::{AppError, AppResult, ok_with_message};
use shared::{ApiResponse, StaffView};

/// 登录请求体
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// 登录响应数据
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub staff: StaffView,
    pub access_token: String,
}

/// POST /api/staff/login
///
/// 未知邮箱与错误密码返回完全相同的 401 消息，防止账号枚举。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginData>>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let repo = StaffRepository::new(state.db.clone());
    let staff = repo.find_by_email(&req.email).await?;

    let staff = match staff {
        Some(s) => s,
        None => {
            tracing::warn!(email = %req.email.to_lowercase(), "Login failed - unknown email");
            return Err(AppError::invalid_credentials());
        }
    };

    // 停用检查先于密码校验：停用账号不论密码对错一律 403
    if !staff.is_active {
        return Err(AppError::forbidden("Staff account is inactive"));
    }

    let password_valid = staff
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        crate::security_log!(
            "WARN",
            "login_failed",
            email = req.email.to_lowercase(),
            reason = "invalid_password"
        );
        return Err(AppError::invalid_credentials());
    }

    let user_id = staff.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &staff.staff_name, staff.role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    crate::security_log!("INFO", "login_success", user_id = user_id);

    Ok(ok_with_message(
        LoginData {
            staff: staff.to_view(),
            access_token: token,
        },
        "Login successful",
    ))
}

/// GET /api/staff/logout
///
/// 把当前令牌写入吊销表；重复吊销同一令牌视为成功。
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Extension(token): Extension<BearerToken>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .revocation
        .revoke(&token.0, &user.id, user.user_type, Some(user.exp), "logout")
        .await?;

    crate::security_log!("INFO", "logout", user_id = user.id);

    Ok(ok_with_message((), "Logged out successfully"))
}
