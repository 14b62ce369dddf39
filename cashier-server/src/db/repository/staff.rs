//! Staff Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::Staff;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "staff";

#[derive(Clone)]
pub struct StaffRepository {
    base: BaseRepository,
}

impl StaffRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find staff by email (lookup is case-insensitive, emails are stored lowercase)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Staff>> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM staff WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?;
        let staff: Vec<Staff> = result.take(0)?;
        Ok(staff.into_iter().next())
    }

    /// Create a staff record (seed/test fixture only, no API surface)
    pub async fn create(&self, staff: Staff) -> RepoResult<Option<Staff>> {
        let created: Option<Staff> = self.base.db().create(TABLE).content(staff).await?;
        Ok(created)
    }
}
