use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::users::repo_types::{NewUser, User};
use crate::users::store::{StoreError, UserStore};

/// `users` table backed store.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Maps a constraint violation on `users` to the matching store error.
fn classify_violation(err: sqlx::Error) -> StoreError {
    let constraint = err
        .as_database_error()
        .and_then(|db_err| db_err.constraint())
        .map(str::to_owned);

    match constraint.as_deref() {
        Some("users_username_key") => StoreError::UsernameTaken,
        Some("users_email_key") => StoreError::EmailTaken,
        Some(name) => match empty_field_for(name) {
            Some(field) => StoreError::EmptyField(field),
            None => StoreError::Database(err),
        },
        None => StoreError::Database(err),
    }
}

fn empty_field_for(constraint: &str) -> Option<&'static str> {
    match constraint {
        "users_username_not_empty" => Some("username"),
        "users_fullname_not_empty" => Some("fullname"),
        "users_email_not_empty" => Some("email"),
        "users_password_not_empty" => Some("password"),
        _ => None,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        new.validate()?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, fullname, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, fullname, email, password, created_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.fullname)
        .bind(&new.email)
        .bind(&new.password)
        .fetch_one(&self.db)
        .await
        .map_err(classify_violation)?;
        debug!(user_id = user.id, "user row inserted");
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, fullname, email, password, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, fullname, email, password, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, fullname, email, password, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
