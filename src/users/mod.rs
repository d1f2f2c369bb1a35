use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod store;

pub use repo::PgUserStore;
pub use repo_types::{NewUser, User};
pub use store::{MemoryUserStore, StoreError, UserStore};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
