use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub status: GoalStatus,
    pub start_date: Option<NaiveDate>,
    pub deadline_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status. Any status may be set from any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "goal_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    Active,
    Completed,
    Paused,
    Failed,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Goal name must be 1-200 characters"))]
    pub name: String,

    pub target_value: f64,

    #[serde(default)]
    pub current_value: f64,

    #[validate(length(min = 1, max = 50, message = "Unit must be 1-50 characters"))]
    pub unit: String,

    pub start_date: Option<NaiveDate>,
    pub deadline_date: Option<NaiveDate>,
    pub status: Option<GoalStatus>,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Goal name must be 1-200 characters"))]
    pub name: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    #[validate(length(min = 1, max = 50, message = "Unit must be 1-50 characters"))]
    pub unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline_date: Option<NaiveDate>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    pub current_value: f64,
}

/// Goal as shown on the dashboard and goal cards.
#[derive(Debug, Clone, Serialize)]
pub struct GoalSummary {
    pub id: Uuid,
    pub name: String,
    pub status: GoalStatus,
    pub progress: i64,
    pub target: String,
    pub current: String,
}

pub const DEADLINE_BEFORE_START_MESSAGE: &str = "Deadline cannot be before the start date";

fn check_values(target: Option<f64>, current: Option<f64>) -> Result<(), String> {
    if let Some(target) = target {
        if !target.is_finite() || target <= 0.0 {
            return Err("Target value must be greater than 0".into());
        }
    }
    if let Some(current) = current {
        if !current.is_finite() || current < 0.0 {
            return Err("Current value cannot be negative".into());
        }
    }
    Ok(())
}

fn check_dates(start: Option<NaiveDate>, deadline: Option<NaiveDate>) -> Result<(), String> {
    match (start, deadline) {
        (Some(start), Some(deadline)) if deadline < start => {
            Err(DEADLINE_BEFORE_START_MESSAGE.into())
        }
        _ => Ok(()),
    }
}

impl CreateGoalRequest {
    pub fn validate_values(&self) -> Result<(), String> {
        check_values(Some(self.target_value), Some(self.current_value))?;
        check_dates(self.start_date, self.deadline_date)
    }
}

impl UpdateGoalRequest {
    pub fn validate_values(&self) -> Result<(), String> {
        check_values(self.target_value, self.current_value)?;
        check_dates(self.start_date, self.deadline_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(json: &str) -> CreateGoalRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&GoalStatus::NotStarted).unwrap(),
            r#""not_started""#
        );
        let parsed: GoalStatus = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(parsed, GoalStatus::Paused);
    }

    #[test]
    fn test_status_defaults_to_not_started() {
        assert_eq!(GoalStatus::default(), GoalStatus::NotStarted);
    }

    #[test]
    fn test_create_request_defaults_current_value() {
        let req = create_request(r#"{"name":"Lose weight","target_value":10,"unit":"kg"}"#);
        assert_eq!(req.current_value, 0.0);
        assert!(req.status.is_none());
        assert!(req.validate().is_ok());
        assert!(req.validate_values().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let req = create_request(r#"{"name":"","target_value":10,"unit":"kg"}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_non_positive_target() {
        let req = create_request(r#"{"name":"Steps","target_value":0,"unit":"steps"}"#);
        assert_eq!(
            req.validate_values().unwrap_err(),
            "Target value must be greater than 0"
        );
    }

    #[test]
    fn test_deadline_before_start_rejected() {
        let req = create_request(
            r#"{"name":"Run","target_value":5,"unit":"km","start_date":"2026-03-10","deadline_date":"2026-03-01"}"#,
        );
        assert!(req.validate_values().is_err());
    }

    #[test]
    fn test_update_request_all_optional() {
        let req: UpdateGoalRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.validate_values().is_ok());
    }

    #[test]
    fn test_update_request_rejects_negative_current() {
        let req: UpdateGoalRequest = serde_json::from_str(r#"{"current_value":-1}"#).unwrap();
        assert!(req.validate_values().is_err());
    }
}
