use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Local, NaiveDate};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::daily_log::{
    CreateDailyLogRequest, DailyLog, DailyLogListQuery, DailyMetrics, RecentLogsQuery,
};
use crate::AppState;

fn logs(state: &AppState) -> Repository<DailyLog> {
    Repository::new(state.db.clone())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// First day of a window of `days` days ending today.
fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days - 1)
}

pub async fn list_daily_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DailyLogListQuery>,
) -> AppResult<Json<Vec<DailyLog>>> {
    let logs = logs(&state)
        .list(&auth_user.actor, Some(query.limit()))
        .await?;
    Ok(Json(logs))
}

pub async fn recent_daily_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecentLogsQuery>,
) -> AppResult<Json<Vec<DailyLog>>> {
    let since = window_start(today(), query.days());
    let logs = logs(&state).list_since(&auth_user.actor, since).await?;
    Ok(Json(logs))
}

/// `null` when nothing was logged that day.
pub async fn get_daily_log_by_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(log_date): Path<NaiveDate>,
) -> AppResult<Json<Option<DailyLog>>> {
    let log = logs(&state)
        .find_by_date(&auth_user.actor, log_date)
        .await?;
    Ok(Json(log))
}

pub async fn create_daily_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateDailyLogRequest>,
) -> AppResult<(StatusCode, Json<DailyLog>)> {
    body.validate()?;
    body.validate_date(today()).map_err(AppError::Validation)?;

    let log = logs(&state).create(&auth_user.actor, &body).await?;
    tracing::info!(log_id = %log.id, log_date = %log.log_date, "Daily log created");
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn update_daily_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(log_id): Path<Uuid>,
    Json(body): Json<DailyMetrics>,
) -> AppResult<Json<DailyLog>> {
    body.validate()?;

    let log = logs(&state)
        .replace_metrics(&auth_user.actor, log_id, &body)
        .await?;
    Ok(Json(log))
}

pub async fn delete_daily_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(log_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    logs(&state)
        .delete(&auth_user.actor, log_id, "delete logs")
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_includes_today() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        assert_eq!(window_start(today, 7), NaiveDate::from_ymd_opt(2026, 2, 5).unwrap());
        assert_eq!(window_start(today, 1), today);
    }
}
