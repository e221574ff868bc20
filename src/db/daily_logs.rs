use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::actor::ActorContext;
use crate::db::repository::{OwnedEntity, Repository};
use crate::error::{AppError, AppResult};
use crate::models::daily_log::{
    CreateDailyLogRequest, DailyLog, DailyMetrics, DUPLICATE_DATE_MESSAGE,
};

impl OwnedEntity for DailyLog {
    const TABLE: &'static str = "daily_logs";
    const SCOPE_COLUMN: &'static str = "user_id";
    const ORDER_BY: &'static str = "log_date DESC";
    const LABEL: &'static str = "Daily log";
}

impl Repository<DailyLog> {
    /// The log for one calendar date, if the actor has recorded it.
    pub async fn find_by_date(
        &self,
        actor: &ActorContext,
        log_date: NaiveDate,
    ) -> AppResult<Option<DailyLog>> {
        let log = sqlx::query_as::<_, DailyLog>(
            "SELECT * FROM daily_logs WHERE user_id = $1 AND log_date = $2",
        )
        .bind(actor.owner_id())
        .bind(log_date)
        .fetch_optional(self.db())
        .await?;

        Ok(log)
    }

    /// Logs dated on or after `since`, newest first.
    pub async fn list_since(
        &self,
        actor: &ActorContext,
        since: NaiveDate,
    ) -> AppResult<Vec<DailyLog>> {
        let logs = sqlx::query_as::<_, DailyLog>(
            r#"
            SELECT * FROM daily_logs
            WHERE user_id = $1 AND log_date >= $2
            ORDER BY log_date DESC
            "#,
        )
        .bind(actor.owner_id())
        .bind(since)
        .fetch_all(self.db())
        .await?;

        Ok(logs)
    }

    /// Inserts the first log for a date. A second log for the same date is a
    /// conflict; callers edit the existing row instead.
    pub async fn create(
        &self,
        actor: &ActorContext,
        body: &CreateDailyLogRequest,
    ) -> AppResult<DailyLog> {
        let owner = actor.writable_owner("create logs")?;
        let m = &body.metrics;

        sqlx::query_as::<_, DailyLog>(
            r#"
            INSERT INTO daily_logs (
                id, user_id, log_date, workout_completed, workout_time_minutes,
                steps, calories_consumed, protein_intake_g, water_ml, weight_kg,
                sleep_hours, mood_rating, energy_level, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(body.log_date)
        .bind(m.workout_completed)
        .bind(m.workout_time_minutes)
        .bind(m.steps)
        .bind(m.calories_consumed)
        .bind(m.protein_intake_g)
        .bind(m.water_ml)
        .bind(m.weight_kg)
        .bind(m.sleep_hours)
        .bind(m.mood_rating)
        .bind(m.energy_level)
        .bind(&m.notes)
        .fetch_one(self.db())
        .await
        .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_DATE_MESSAGE))
    }

    /// Replaces every metric of an existing log. The date is fixed once the
    /// log exists.
    pub async fn replace_metrics(
        &self,
        actor: &ActorContext,
        id: Uuid,
        m: &DailyMetrics,
    ) -> AppResult<DailyLog> {
        let owner = actor.writable_owner("update logs")?;

        sqlx::query_as::<_, DailyLog>(
            r#"
            UPDATE daily_logs SET
                workout_completed = $3,
                workout_time_minutes = $4,
                steps = $5,
                calories_consumed = $6,
                protein_intake_g = $7,
                water_ml = $8,
                weight_kg = $9,
                sleep_hours = $10,
                mood_rating = $11,
                energy_level = $12,
                notes = $13,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(m.workout_completed)
        .bind(m.workout_time_minutes)
        .bind(m.steps)
        .bind(m.calories_consumed)
        .bind(m.protein_intake_g)
        .bind(m.water_ml)
        .bind(m.weight_kg)
        .bind(m.sleep_hours)
        .bind(m.mood_rating)
        .bind(m.energy_level)
        .bind(&m.notes)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(Self::not_found)
    }
}
