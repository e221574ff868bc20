use axum::{extract::State, Json};
use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::create_demo_access_token;
use crate::config::Config;
use crate::db::profiles::insert_profile;
use crate::error::{AppError, AppResult};
use crate::models::goal::GoalStatus;
use crate::AppState;

pub const DEMO_EMAIL: &str = "demo@healthpulse.local";
pub const DEMO_HISTORY_DAYS: i64 = 14;

#[derive(Debug, Serialize)]
pub struct DemoStartResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub demo_expires_at: String,
    pub is_demo: bool,
}

// ── POST /api/demo/start ─────────────────────────────────────────────────────

pub async fn start_demo(State(state): State<AppState>) -> AppResult<Json<DemoStartResponse>> {
    if !state.config.demo_enabled {
        return Err(AppError::Forbidden("Demo mode is disabled".into()));
    }

    let ttl = state.config.demo_ttl_secs;
    let expires_at = Utc::now() + Duration::seconds(ttl);
    let access_token = create_demo_access_token(&state.config)?;

    tracing::info!(demo_user_id = %state.config.demo_user_id, "Demo session started");

    Ok(Json(DemoStartResponse {
        access_token,
        expires_in: ttl,
        demo_expires_at: expires_at.to_rfc3339(),
        is_demo: true,
    }))
}

// ── Sample data ──────────────────────────────────────────────────────────────

struct DemoGoal {
    name: &'static str,
    target_value: f64,
    current_value: f64,
    unit: &'static str,
    status: GoalStatus,
}

const DEMO_GOALS: [DemoGoal; 3] = [
    DemoGoal {
        name: "Daily 10k steps",
        target_value: 10000.0,
        current_value: 7800.0,
        unit: "steps",
        status: GoalStatus::Active,
    },
    DemoGoal {
        name: "Drink more water",
        target_value: 2500.0,
        current_value: 1900.0,
        unit: "ml",
        status: GoalStatus::Active,
    },
    DemoGoal {
        name: "Run a 5k",
        target_value: 5.0,
        current_value: 5.0,
        unit: "km",
        status: GoalStatus::Completed,
    },
];

#[derive(Debug, Clone, PartialEq)]
struct DemoLog {
    log_date: NaiveDate,
    workout_completed: bool,
    workout_time_minutes: Option<i32>,
    steps: i32,
    calories_consumed: i32,
    water_ml: i32,
    sleep_hours: f64,
    mood_rating: i16,
    energy_level: i16,
}

/// Two weeks of plausible, imperfect history ending today. Values depend
/// only on the date, so re-seeding the same day is a no-op.
fn demo_log_plan(today: NaiveDate) -> Vec<DemoLog> {
    (0..DEMO_HISTORY_DAYS)
        .map(|days_ago| {
            let log_date = today - Duration::days(days_ago);
            let seed = log_date.num_days_from_ce() as i64;
            let workout_completed = seed % 3 != 0;

            DemoLog {
                log_date,
                workout_completed,
                workout_time_minutes: workout_completed.then_some(30 + (seed % 4) as i32 * 10),
                steps: 6000 + (seed * 733 % 6000) as i32,
                calories_consumed: 1900 + (seed * 97 % 500) as i32,
                water_ml: 1500 + (seed % 5) as i32 * 250,
                sleep_hours: 6.0 + (seed % 5) as f64 * 0.5,
                mood_rating: 2 + (seed % 4) as i16,
                energy_level: 2 + ((seed + 1) % 4) as i16,
            }
        })
        .collect()
}

/// Idempotently brings the shared demo identity up to date: account,
/// profile, goals and a rolling window of daily logs.
pub async fn seed_demo_data(db: &PgPool, config: &Config) -> AppResult<()> {
    let user_id = config.demo_user_id;
    let today = Local::now().date_naive();

    let mut tx = db.begin().await?;

    // No password: the demo identity is only reachable through demo tokens.
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, NULL)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(DEMO_EMAIL)
    .execute(&mut *tx)
    .await?;

    insert_profile(&mut *tx, user_id, DEMO_EMAIL, Some("Demo Athlete"), true).await?;

    sqlx::query(
        r#"
        UPDATE profiles SET
            height_cm = COALESCE(height_cm, 175),
            weight_kg = COALESCE(weight_kg, 72.5),
            fitness_level = COALESCE(fitness_level, 'intermediate'::fitness_level),
            onboarding_complete = true
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let goal_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM goals WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    if goal_count == 0 {
        for goal in &DEMO_GOALS {
            sqlx::query(
                r#"
                INSERT INTO goals (id, user_id, name, target_value, current_value, unit, status, start_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(goal.name)
            .bind(goal.target_value)
            .bind(goal.current_value)
            .bind(goal.unit)
            .bind(goal.status)
            .bind(today - Duration::days(DEMO_HISTORY_DAYS))
            .execute(&mut *tx)
            .await?;
        }
    }

    for log in demo_log_plan(today) {
        sqlx::query(
            r#"
            INSERT INTO daily_logs (
                id, user_id, log_date, workout_completed, workout_time_minutes,
                steps, calories_consumed, water_ml, sleep_hours, mood_rating, energy_level
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, log_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(log.log_date)
        .bind(log.workout_completed)
        .bind(log.workout_time_minutes)
        .bind(log.steps)
        .bind(log.calories_consumed)
        .bind(log.water_ml)
        .bind(log.sleep_hours)
        .bind(log.mood_rating)
        .bind(log.energy_level)
        .execute(&mut *tx)
        .await?;
    }

    let pruned = sqlx::query("DELETE FROM daily_logs WHERE user_id = $1 AND log_date <= $2")
        .bind(user_id)
        .bind(today - Duration::days(DEMO_HISTORY_DAYS))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    tracing::debug!(demo_user_id = %user_id, pruned_logs = pruned, "Demo data refreshed");
    Ok(())
}

// ── Demo Refresh Worker ──────────────────────────────────────────────────────

/// Keeps the sample history rolling forward so the dashboard always has a
/// current and a previous week to compare.
pub fn spawn_demo_refresh_worker(db: PgPool, config: Arc<Config>) {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(config.demo_refresh_secs.max(60));
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; start-up already seeded.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = seed_demo_data(&db, &config).await {
                tracing::error!(error = %e, "Demo refresh worker error");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 11).unwrap()
    }

    #[test]
    fn test_plan_covers_fourteen_distinct_days() {
        let plan = demo_log_plan(today());
        let dates: HashSet<_> = plan.iter().map(|l| l.log_date).collect();

        assert_eq!(plan.len(), 14);
        assert_eq!(dates.len(), 14);
        assert!(dates.contains(&today()));
        assert!(dates.contains(&NaiveDate::from_ymd_opt(2026, 1, 29).unwrap()));
        assert!(plan.iter().all(|l| l.log_date <= today()));
    }

    #[test]
    fn test_plan_is_deterministic_per_date() {
        assert_eq!(demo_log_plan(today()), demo_log_plan(today()));

        let tomorrow = demo_log_plan(today() + Duration::days(1));
        let overlap = tomorrow.iter().find(|l| l.log_date == today()).unwrap();
        assert_eq!(overlap, &demo_log_plan(today())[0]);
    }

    #[test]
    fn test_plan_values_pass_log_validation() {
        for log in demo_log_plan(today()) {
            assert!((1..=5).contains(&log.mood_rating));
            assert!((1..=5).contains(&log.energy_level));
            assert!((0.0..=24.0).contains(&log.sleep_hours));
            assert!(log.steps >= 0 && log.calories_consumed >= 0 && log.water_ml >= 0);
            assert_eq!(log.workout_completed, log.workout_time_minutes.is_some());
        }
    }

    #[test]
    fn test_plan_is_not_perfect() {
        let plan = demo_log_plan(today());
        let workouts = plan.iter().filter(|l| l.workout_completed).count();
        assert!(workouts > 0 && workouts < plan.len());
    }

    #[test]
    fn test_demo_goals_include_active_and_completed() {
        assert_eq!(
            DEMO_GOALS.iter().filter(|g| g.status == GoalStatus::Active).count(),
            2
        );
        assert!(DEMO_GOALS.iter().any(|g| g.status == GoalStatus::Completed));
        assert!(DEMO_GOALS.iter().all(|g| g.target_value > 0.0));
    }

    #[test]
    fn test_demo_start_response_shape() {
        let resp = DemoStartResponse {
            access_token: "tok".into(),
            expires_in: 3600,
            demo_expires_at: "2026-02-10T12:00:00Z".into(),
            is_demo: true,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["is_demo"], true);
        assert_eq!(json["expires_in"], 3600);
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("user_id").is_none());
    }
}
