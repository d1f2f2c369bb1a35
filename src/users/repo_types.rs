use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::store::StoreError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,                      // assigned by the store, never reused
    pub username: String,             // unique
    pub fullname: String,
    pub email: String,                // unique, compared as stored
    #[serde(skip_serializing)]
    pub password: String,             // Argon2 PHC string, not exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,   // set on insert
}

/// Insert shape for a user. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Rejects the first empty field. Values are not altered.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (field, value) in [
            ("username", &self.username),
            ("fullname", &self.fullname),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                return Err(StoreError::EmptyField(field));
            }
        }
        Ok(())
    }
}
