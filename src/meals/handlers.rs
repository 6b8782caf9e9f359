use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    extractors::ValidJson,
    session::SessionId,
    state::AppState,
};

use super::dto::{MealBody, MealsEnvelope, MetricsResponse};
use super::repo::{Meal, MealChanges};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/", get(list_meals).post(create_meal))
        .route("/meals/metricsId", get(metrics))
        .route("/meals/:id", get(get_meal).put(update_meal).delete(delete_meal))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    ValidJson(body): ValidJson<MealBody>,
) -> Result<StatusCode, AppError> {
    body.validate()?;

    let meal = Meal {
        id: Uuid::new_v4(),
        name: body.name,
        description: body.description,
        is_on_diet: body.is_on_diet,
        date: body.date.0,
        user_id: session,
    };
    state.meals.insert(&meal).await?;

    info!(meal_id = %meal.id, user_id = %meal.user_id, "meal created");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    SessionId(session): SessionId,
) -> Result<Json<MealsEnvelope<Vec<Meal>>>, AppError> {
    let meals = state.meals.list_by_user(&session).await?;
    Ok(Json(MealsEnvelope { meals }))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Path(id): Path<String>,
) -> Result<Json<MealsEnvelope<Meal>>, AppError> {
    let id = parse_meal_id(&id)?;
    match state.meals.find(&session, id).await? {
        Some(meal) => Ok(Json(MealsEnvelope { meals: meal })),
        None => Err(not_found(&session, id)),
    }
}

#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<MealBody>,
) -> Result<StatusCode, AppError> {
    let id = parse_meal_id(&id)?;
    body.validate()?;

    let changes = MealChanges {
        name: body.name,
        description: body.description,
        is_on_diet: body.is_on_diet,
        date: body.date.0,
    };
    if !state.meals.update(&session, id, &changes).await? {
        return Err(not_found(&session, id));
    }

    info!(meal_id = %id, user_id = %session, "meal updated");
    Ok(StatusCode::NO_CONTENT)
}

/// The path segment is matched against meal ids as-is; text that is not a
/// UUID cannot name a stored meal and ends up as 404.
#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        warn!(%id, user_id = %session, "delete for non-uuid id");
        return Err(AppError::NotFound(MEAL_NOT_FOUND));
    };
    if !state.meals.delete(&session, id).await? {
        return Err(not_found(&session, id));
    }

    info!(meal_id = %id, user_id = %session, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn metrics(
    State(state): State<AppState>,
    SessionId(session): SessionId,
) -> Result<Json<MetricsResponse>, AppError> {
    let counts = state.meals.counts(&session).await?;
    Ok(Json(MetricsResponse {
        total: counts.total,
        total_meals_off_diet: counts.off_diet,
        total_meals_on_diet: counts.on_diet,
    }))
}

const MEAL_NOT_FOUND: &str = "Meal not found";

fn parse_meal_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid meal id: {raw}")))
}

fn not_found(session: &str, id: Uuid) -> AppError {
    warn!(meal_id = %id, user_id = %session, "meal not found");
    AppError::NotFound(MEAL_NOT_FOUND)
}
