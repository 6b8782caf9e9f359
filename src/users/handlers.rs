use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    extractors::ValidJson,
    session::{session_cookie, SessionId},
    state::AppState,
};

use super::dto::{PublicUser, RegisterRequest};
use super::repo::{EmailTaken, User, UserRepo};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/", post(register))
        .route("/users/me", get(get_me))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<PublicUser>), AppError> {
    let payload = payload.normalize()?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered"));
    }

    let user = insert_user(state.users.as_ref(), &payload.name, &payload.email).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let jar = jar.add(session_cookie(&state.config.session, user.id.to_string()));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

/// Inserts under a fresh id. A concurrent registration that slipped past the
/// email lookup still ends up as a conflict.
async fn insert_user(users: &dyn UserRepo, name: &str, email: &str) -> Result<User, AppError> {
    match users.create(Uuid::new_v4(), name, email).await {
        Ok(user) => Ok(user),
        Err(e) if e.is::<EmailTaken>() => {
            warn!(%email, "email registered concurrently");
            Err(AppError::Conflict("Email already registered"))
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    SessionId(session): SessionId,
) -> Result<Json<PublicUser>, AppError> {
    let user = match Uuid::parse_str(&session) {
        Ok(id) => state.users.find_by_id(id).await?,
        Err(_) => None,
    };
    let Some(user) = user else {
        warn!(user_id = %session, "user not found");
        return Err(AppError::NotFound("User not found"));
    };

    Ok(Json(PublicUser {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
