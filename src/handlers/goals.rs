use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::goal::{CreateGoalRequest, Goal, GoalProgressRequest, UpdateGoalRequest};
use crate::AppState;

fn goals(state: &AppState) -> Repository<Goal> {
    Repository::new(state.db.clone())
}

pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Goal>>> {
    let goals = goals(&state).list(&auth_user.actor, None).await?;
    Ok(Json(goals))
}

pub async fn get_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Goal>> {
    let goal = goals(&state).find(&auth_user.actor, goal_id).await?;
    Ok(Json(goal))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateGoalRequest>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    body.validate()?;
    body.validate_values().map_err(AppError::Validation)?;

    let goal = goals(&state).create(&auth_user.actor, &body).await?;
    tracing::info!(goal_id = %goal.id, user_id = %auth_user.id, "Goal created");
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<UpdateGoalRequest>,
) -> AppResult<Json<Goal>> {
    body.validate()?;
    body.validate_values().map_err(AppError::Validation)?;

    let goal = goals(&state).update(&auth_user.actor, goal_id, &body).await?;
    Ok(Json(goal))
}

pub async fn update_goal_progress(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<GoalProgressRequest>,
) -> AppResult<Json<Goal>> {
    if !body.current_value.is_finite() || body.current_value < 0.0 {
        return Err(AppError::Validation("Current value cannot be negative".into()));
    }

    let goal = goals(&state)
        .set_progress(&auth_user.actor, goal_id, body.current_value)
        .await?;
    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    goals(&state)
        .delete(&auth_user.actor, goal_id, "delete goals")
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
