//! Staff Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::StaffView;
use surrealdb::RecordId;

/// Staff ID type
pub type StaffId = RecordId;

/// 员工实体
///
/// 由管理端种子数据创建，本服务只读 (除 `is_active` / `profile_image_url`
/// 由外部管理流程变更)。`email` 全小写存储并有唯一索引。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<StaffId>,
    pub restaurant_code: String,
    pub staff_name: String,
    /// argon2 哈希。实体序列化即持久化路径，哈希必须随行写入；
    /// 对外响应一律走 [`Staff::to_view`]，视图里没有这个字段。
    pub password: String,
    pub role: i32,
    pub mobile_number: String,
    pub email: String,
    pub address: String,
    pub nic: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Staff {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// 线上视图 (不含密码)
    pub fn to_view(&self) -> StaffView {
        StaffView {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            staff_name: self.staff_name.clone(),
            email: self.email.clone(),
            role: self.role,
            mobile_number: self.mobile_number.clone(),
            address: self.address.clone(),
            nic: self.nic.clone(),
            profile_image_url: self.profile_image_url.clone(),
            is_active: self.is_active,
        }
    }
}
