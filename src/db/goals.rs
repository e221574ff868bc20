use uuid::Uuid;

use crate::auth::actor::ActorContext;
use crate::db::repository::{OwnedEntity, Repository};
use crate::error::{AppError, AppResult};
use crate::models::goal::{
    CreateGoalRequest, Goal, UpdateGoalRequest, DEADLINE_BEFORE_START_MESSAGE,
};

/// Keeps a deadline on or after the start date, including when a partial
/// update sends only one of the two.
pub(crate) const DATES_ORDERED_CONSTRAINT: &str = "goals_dates_ordered";

fn date_order_error(err: sqlx::Error) -> AppError {
    AppError::validation_on_constraint(err, DATES_ORDERED_CONSTRAINT, DEADLINE_BEFORE_START_MESSAGE)
}

impl OwnedEntity for Goal {
    const TABLE: &'static str = "goals";
    const SCOPE_COLUMN: &'static str = "user_id";
    const ORDER_BY: &'static str = "created_at DESC";
    const LABEL: &'static str = "Goal";
}

impl Repository<Goal> {
    pub async fn create(&self, actor: &ActorContext, body: &CreateGoalRequest) -> AppResult<Goal> {
        let owner = actor.writable_owner("create goals")?;

        let goal = sqlx::query_as::<_, Goal>(
            r#"
            INSERT INTO goals (
                id, user_id, name, target_value, current_value, unit,
                status, start_date, deadline_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&body.name)
        .bind(body.target_value)
        .bind(body.current_value)
        .bind(&body.unit)
        .bind(body.status.unwrap_or_default())
        .bind(body.start_date)
        .bind(body.deadline_date)
        .fetch_one(self.db())
        .await
        .map_err(date_order_error)?;

        Ok(goal)
    }

    pub async fn update(
        &self,
        actor: &ActorContext,
        id: Uuid,
        body: &UpdateGoalRequest,
    ) -> AppResult<Goal> {
        let owner = actor.writable_owner("update goals")?;

        sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals SET
                name = COALESCE($3, name),
                target_value = COALESCE($4, target_value),
                current_value = COALESCE($5, current_value),
                unit = COALESCE($6, unit),
                status = COALESCE($7, status),
                start_date = COALESCE($8, start_date),
                deadline_date = COALESCE($9, deadline_date),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&body.name)
        .bind(body.target_value)
        .bind(body.current_value)
        .bind(&body.unit)
        .bind(body.status)
        .bind(body.start_date)
        .bind(body.deadline_date)
        .fetch_optional(self.db())
        .await
        .map_err(date_order_error)?
        .ok_or_else(Self::not_found)
    }

    pub async fn set_progress(
        &self,
        actor: &ActorContext,
        id: Uuid,
        current_value: f64,
    ) -> AppResult<Goal> {
        let owner = actor.writable_owner("update goal progress")?;

        sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals SET current_value = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(current_value)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(Self::not_found)
    }
}
