use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::actor::ActorContext;
use crate::db::Repository;
use crate::error::AppResult;
use crate::models::daily_log::DailyLog;
use crate::models::goal::{Goal, GoalStatus, GoalSummary};
use crate::services::goal_progress::summarize;
use crate::services::stats::{calculate_stats, DashboardStats};
use crate::services::week::WeekBoundaries;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub goals: Vec<GoalSummary>,
    pub stats: DashboardStats,
}

/// Where the dashboard reads its inputs from.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn goals(&self, actor: &ActorContext) -> AppResult<Vec<Goal>>;
    async fn logs_since(&self, actor: &ActorContext, since: NaiveDate) -> AppResult<Vec<DailyLog>>;
}

pub struct PgDashboardSource {
    goals: Repository<Goal>,
    logs: Repository<DailyLog>,
}

impl PgDashboardSource {
    pub fn new(db: PgPool) -> Self {
        Self {
            goals: Repository::new(db.clone()),
            logs: Repository::new(db),
        }
    }
}

#[async_trait]
impl DashboardSource for PgDashboardSource {
    async fn goals(&self, actor: &ActorContext) -> AppResult<Vec<Goal>> {
        self.goals.list(actor, None).await
    }

    async fn logs_since(&self, actor: &ActorContext, since: NaiveDate) -> AppResult<Vec<DailyLog>> {
        self.logs.list_since(actor, since).await
    }
}

/// Builds the dashboard for `actor` as of `now`.
///
/// A failed fetch is logged and yields zeroed stats with no goals; the
/// dashboard never surfaces an error.
pub async fn load_dashboard<S>(source: &S, actor: &ActorContext, now: NaiveDateTime) -> Dashboard
where
    S: DashboardSource + ?Sized,
{
    let goals = match source.goals(actor).await {
        Ok(goals) => goals,
        Err(e) => {
            tracing::error!(error = %e, owner = %actor.owner_id(), "Failed to fetch dashboard goals");
            return Dashboard::default();
        }
    };

    let since = WeekBoundaries::previous(now).first_day();
    let logs = match source.logs_since(actor, since).await {
        Ok(logs) => logs,
        Err(e) => {
            tracing::error!(error = %e, owner = %actor.owner_id(), "Failed to fetch dashboard logs");
            return Dashboard::default();
        }
    };

    let stats = calculate_stats(&goals, &logs, now);
    let goals = goals
        .iter()
        .filter(|g| g.status == GoalStatus::Active)
        .map(summarize)
        .collect();

    Dashboard { goals, stats }
}
