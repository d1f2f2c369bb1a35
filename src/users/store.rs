use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::users::repo_types::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("username already taken")]
    UsernameTaken,

    #[error("email already registered")]
    EmailTaken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for user records.
///
/// Implementations assign `id` and `created_at` on insert and reject
/// duplicate usernames or emails.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[derive(Default)]
struct MemoryInner {
    users: Vec<User>,
    last_id: i64,
}

/// Process-local store with the same constraints as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        new.validate()?;

        // check and insert under one lock
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::UsernameTaken);
        }
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken);
        }

        inner.last_id += 1;
        let user = User {
            id: inner.last_id,
            username: new.username,
            fullname: new.fullname,
            email: new.email,
            password: new.password,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            fullname: "Some One".into(),
            email: email.into(),
            password: "$argon2id$v=19$stub".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_created_at() {
        let store = MemoryUserStore::new();
        let before = OffsetDateTime::now_utc();

        let user = store
            .create(NewUser {
                username: "alice".into(),
                fullname: "Alice A".into(),
                email: "alice@example.com".into(),
                password: "<hash>".into(),
            })
            .await
            .expect("create alice");

        assert!(user.id > 0);
        assert!(user.created_at >= before);
        assert!(user.created_at <= OffsetDateTime::now_utc());
        assert_eq!(user.username, "alice");
        assert_eq!(user.fullname, "Alice A");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let err = store
            .create(new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let err = store
            .create(new_user("bob", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[tokio::test]
    async fn emails_differing_in_case_are_distinct() {
        let store = MemoryUserStore::new();
        let lower = store.create(new_user("alice", "alice@example.com")).await.unwrap();
        let mixed = store.create(new_user("bob", "Alice@Example.com")).await.unwrap();

        assert_ne!(lower.id, mixed.id);
        assert_eq!(mixed.email, "Alice@Example.com");
        let found = store.find_by_email("Alice@Example.com").await.unwrap().unwrap();
        assert_eq!(found.id, mixed.id);
    }

    #[tokio::test]
    async fn values_are_stored_as_given() {
        let store = MemoryUserStore::new();
        let user = store
            .create(NewUser {
                username: " dave ".into(),
                fullname: "   ".into(),
                email: "dave@example.com".into(),
                password: "<hash>".into(),
            })
            .await
            .expect("whitespace is not empty");

        assert_eq!(user.username, " dave ");
        assert_eq!(user.fullname, "   ");
        let found = store.find_by_username(" dave ").await.unwrap().expect("by username");
        assert_eq!(found.id, user.id);
        assert!(store.find_by_username("dave").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_insert() {
        let store = MemoryUserStore::new();
        let err = store.create(new_user("", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyField("username")));
        assert!(store.find_by_email("a@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_insert_does_not_consume_an_id() {
        let store = MemoryUserStore::new();
        let first = store.create(new_user("alice", "alice@example.com")).await.unwrap();
        store.create(new_user("alice", "x@example.com")).await.unwrap_err();
        let second = store.create(new_user("bob", "bob@example.com")).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn lookups_find_created_user() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let by_id = store.find_by_id(user.id).await.unwrap().expect("by id");
        let by_name = store.find_by_username("alice").await.unwrap().expect("by username");
        let by_email = store.find_by_email("alice@example.com").await.unwrap().expect("by email");

        assert_eq!(by_id.id, user.id);
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_email.id, user.id);
        assert!(store.find_by_id(user.id + 1).await.unwrap().is_none());
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_keep_usernames_emails_and_ids_unique() {
        let store = Arc::new(MemoryUserStore::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                // every name collides with one other task
                let name = format!("user{}", i / 2);
                store
                    .create(new_user(&name, &format!("{name}-{i}@example.com")))
                    .await
            }));
        }

        let mut created = Vec::new();
        for handle in handles {
            if let Ok(user) = handle.await.unwrap() {
                created.push(user);
            }
        }

        assert_eq!(created.len(), 16);
        let ids: HashSet<_> = created.iter().map(|u| u.id).collect();
        let names: HashSet<_> = created.iter().map(|u| u.username.clone()).collect();
        let emails: HashSet<_> = created.iter().map(|u| u.email.clone()).collect();
        assert_eq!(ids.len(), created.len());
        assert_eq!(names.len(), created.len());
        assert_eq!(emails.len(), created.len());
    }
}
