use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::{ApiError, StoreError},
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let mut new_user = payload.validate()?;

    if state.config.auth.hash_passwords {
        new_user.password = hash_password(&new_user.password).map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::Internal(e.to_string())
        })?;
    }

    let id = match state.users.create(&new_user).await {
        Ok(id) => id,
        Err(StoreError::Conflict(detail)) => {
            warn!(username = %new_user.username, %detail, "username or email taken");
            return Err(ApiError::BadRequest(
                "Username or email already exists".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = id, username = %new_user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = payload.credentials().ok_or_else(|| {
        ApiError::BadRequest("Username and password are required".into())
    })?;

    let user = if state.config.auth.hash_passwords {
        find_hashed(&state, &username, &password).await?
    } else {
        state.users.find_by_credentials(&username, &password).await?
    };

    let Some(user) = user else {
        warn!(%username, "login rejected");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".into(),
        ));
    };

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        user: PublicUser::from(user),
    }))
}

async fn find_hashed(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    let user = state.users.find_by_username(username).await?;
    Ok(user.filter(|u| verify_password(password, &u.password)))
}
