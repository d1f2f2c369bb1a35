use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{CreateUserRequest, PublicUser},
        password::hash_password,
        repo_types::NewUser,
        store::StoreError,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
}

fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::EmptyField(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        StoreError::UsernameTaken | StoreError::EmailTaken => {
            (StatusCode::CONFLICT, e.to_string())
        }
        StoreError::Database(ref err) => {
            error!(error = %err, "user store failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<PublicUser>), (StatusCode, String)> {
    let new = NewUser {
        username: payload.username,
        fullname: payload.fullname,
        email: payload.email,
        password: payload.password,
    };
    // validate before hashing, a hash of "" is not empty
    new.validate().map_err(|e| {
        warn!(error = %e, "rejected registration");
        store_error(e)
    })?;

    let password = hash_password(new.password.clone()).await.map_err(|e| {
        error!(error = %e, "hash_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    })?;

    let user = state
        .users
        .create(NewUser { password, ..new })
        .await
        .map_err(|e| {
            if !matches!(e, StoreError::Database(_)) {
                warn!(error = %e, "rejected registration");
            }
            store_error(e)
        })?;

    info!(user_id = user.id, username = %user.username, "user created");
    let location = format!("/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PublicUser::from(user)),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;
    Ok(Json(PublicUser::from(user)))
}
