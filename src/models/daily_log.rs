use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub workout_completed: bool,
    pub workout_time_minutes: Option<i32>,
    pub steps: Option<i32>,
    pub calories_consumed: Option<i32>,
    pub protein_intake_g: Option<f64>,
    pub water_ml: Option<i32>,
    pub weight_kg: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub mood_rating: Option<i16>,
    pub energy_level: Option<i16>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metric fields shared by create and update. On update every field is
/// written, so an omitted metric is cleared.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct DailyMetrics {
    #[serde(default)]
    pub workout_completed: bool,

    #[validate(range(min = 0, max = 1440, message = "Workout time must be 0-1440 minutes"))]
    pub workout_time_minutes: Option<i32>,

    #[validate(range(min = 0, message = "Steps cannot be negative"))]
    pub steps: Option<i32>,

    #[validate(range(min = 0, message = "Calories cannot be negative"))]
    pub calories_consumed: Option<i32>,

    #[validate(range(min = 0.0, message = "Protein cannot be negative"))]
    pub protein_intake_g: Option<f64>,

    #[validate(range(min = 0, message = "Water intake cannot be negative"))]
    pub water_ml: Option<i32>,

    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight_kg: Option<f64>,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep must be 0-24 hours"))]
    pub sleep_hours: Option<f64>,

    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood_rating: Option<i16>,

    #[validate(range(min = 1, max = 5, message = "Energy must be between 1 and 5"))]
    pub energy_level: Option<i16>,

    #[validate(length(max = 5000, message = "Notes must be under 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDailyLogRequest {
    pub log_date: NaiveDate,
    #[serde(flatten)]
    #[validate]
    pub metrics: DailyMetrics,
}

impl CreateDailyLogRequest {
    /// Logs can be recorded for today or earlier, never ahead.
    pub fn validate_date(&self, today: NaiveDate) -> Result<(), String> {
        if self.log_date > today {
            return Err("Log date cannot be in the future".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyLogListQuery {
    pub limit: Option<i64>,
}

impl DailyLogListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(30).clamp(1, 365)
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentLogsQuery {
    pub days: Option<i64>,
}

impl RecentLogsQuery {
    pub fn days(&self) -> i64 {
        self.days.unwrap_or(7).clamp(1, 365)
    }
}

pub const DUPLICATE_DATE_MESSAGE: &str =
    "A log already exists for this date. Please edit the existing log or choose a different date.";

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(json: &str) -> CreateDailyLogRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_request_flattens_metrics() {
        let req = create_request(
            r#"{"log_date":"2026-02-10","workout_completed":true,"workout_time_minutes":45,"water_ml":2000}"#,
        );
        assert!(req.metrics.workout_completed);
        assert_eq!(req.metrics.workout_time_minutes, Some(45));
        assert_eq!(req.metrics.water_ml, Some(2000));
        assert!(req.metrics.calories_consumed.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_workout_completed_defaults_false() {
        let req = create_request(r#"{"log_date":"2026-02-10"}"#);
        assert!(!req.metrics.workout_completed);
    }

    #[test]
    fn test_mood_out_of_range_rejected() {
        let req = create_request(r#"{"log_date":"2026-02-10","mood_rating":6}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sleep_over_24_rejected() {
        let metrics = DailyMetrics {
            sleep_hours: Some(25.0),
            ..Default::default()
        };
        assert!(metrics.validate().is_err());
    }

    #[test]
    fn test_negative_steps_rejected() {
        let metrics = DailyMetrics {
            steps: Some(-10),
            ..Default::default()
        };
        assert!(metrics.validate().is_err());
    }

    #[test]
    fn test_future_date_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let req = create_request(r#"{"log_date":"2026-02-11"}"#);
        assert!(req.validate_date(today).is_err());
        let req = create_request(r#"{"log_date":"2026-02-10"}"#);
        assert!(req.validate_date(today).is_ok());
    }

    #[test]
    fn test_list_query_limit_defaults_and_clamps() {
        assert_eq!(DailyLogListQuery { limit: None }.limit(), 30);
        assert_eq!(DailyLogListQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(DailyLogListQuery { limit: Some(10_000) }.limit(), 365);
        assert_eq!(RecentLogsQuery { days: None }.days(), 7);
    }
}
