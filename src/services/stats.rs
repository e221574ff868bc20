//! Dashboard statistics.
//!
//! [`calculate_stats`] is a pure function of the user's goals, the daily logs
//! covering last week and this week, and the caller's notion of "now". It has
//! no failure mode: missing metrics are left out of averages, and any average
//! or trend over an empty set is reported as zero.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::daily_log::DailyLog;
use crate::models::goal::{Goal, GoalStatus};
use crate::services::week::{day_of_week, WeekBoundaries};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_goals: i64,
    /// `"<completed workouts>/<days elapsed this week>"`
    pub weekly_workouts: String,
    pub avg_workout_minutes: i64,
    pub calories_trend: i64,
    pub calories_this_week: i64,
    pub water_trend: i64,
    pub water_this_week: i64,
    /// Counts every completed goal; goals carry no completion timestamp, so
    /// this cannot be narrowed to the current week.
    pub goals_completed_this_week: i64,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            active_goals: 0,
            weekly_workouts: "0/0".into(),
            avg_workout_minutes: 0,
            calories_trend: 0,
            calories_this_week: 0,
            water_trend: 0,
            water_this_week: 0,
            goals_completed_this_week: 0,
        }
    }
}

pub fn calculate_stats(goals: &[Goal], logs: &[DailyLog], now: NaiveDateTime) -> DashboardStats {
    let this_week = WeekBoundaries::containing(now);
    let last_week = WeekBoundaries::previous(now);

    let this_week_logs: Vec<&DailyLog> = logs
        .iter()
        .filter(|log| this_week.contains_date(log.log_date))
        .collect();
    let last_week_logs: Vec<&DailyLog> = logs
        .iter()
        .filter(|log| last_week.contains_date(log.log_date))
        .collect();

    let workouts_done = this_week_logs
        .iter()
        .filter(|log| log.workout_completed)
        .count();

    let avg_workout = average(
        this_week_logs
            .iter()
            .filter(|log| log.workout_completed)
            .filter_map(|log| log.workout_time_minutes),
    );

    let calories_now = average(this_week_logs.iter().filter_map(|log| log.calories_consumed));
    let calories_before = average(last_week_logs.iter().filter_map(|log| log.calories_consumed));
    let water_now = average(this_week_logs.iter().filter_map(|log| log.water_ml));
    let water_before = average(last_week_logs.iter().filter_map(|log| log.water_ml));

    DashboardStats {
        active_goals: count_status(goals, GoalStatus::Active),
        weekly_workouts: format!("{}/{}", workouts_done, day_of_week(now)),
        avg_workout_minutes: round(avg_workout),
        calories_trend: trend_percent(calories_now, calories_before),
        calories_this_week: round(calories_now),
        water_trend: trend_percent(water_now, water_before),
        water_this_week: round(water_now),
        goals_completed_this_week: count_status(goals, GoalStatus::Completed),
    }
}

fn count_status(goals: &[Goal], status: GoalStatus) -> i64 {
    goals.iter().filter(|g| g.status == status).count() as i64
}

/// Mean of the values; 0.0 for an empty iterator.
fn average<I>(values: I) -> f64
where
    I: Iterator<Item = i32>,
{
    let (sum, count) = values.fold((0i64, 0u32), |(sum, count), v| (sum + v as i64, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Percentage change from `previous` to `current`; 0 when there is no
/// previous baseline.
fn trend_percent(current: f64, previous: f64) -> i64 {
    if previous > 0.0 {
        round((current - previous) / previous * 100.0)
    } else {
        0
    }
}

/// Half-away-from-zero rounding; non-finite input collapses to 0.
fn round(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use uuid::Uuid;

    // Wednesday; this week is 2026-02-09..=15, last week 2026-02-02..=08
    fn wednesday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 11)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn goal(status: GoalStatus) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Goal".into(),
            target_value: 10.0,
            current_value: 5.0,
            unit: "kg".into(),
            status,
            start_date: None,
            deadline_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn log(log_date: NaiveDate) -> DailyLog {
        DailyLog {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            log_date,
            workout_completed: false,
            workout_time_minutes: None,
            steps: None,
            calories_consumed: None,
            protein_intake_g: None,
            water_ml: None,
            weight_kg: None,
            sleep_hours: None,
            mood_rating: None,
            energy_level: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn calories(log_date: NaiveDate, kcal: i32) -> DailyLog {
        DailyLog {
            calories_consumed: Some(kcal),
            ..log(log_date)
        }
    }

    fn water(log_date: NaiveDate, ml: i32) -> DailyLog {
        DailyLog {
            water_ml: Some(ml),
            ..log(log_date)
        }
    }

    fn workout(log_date: NaiveDate, minutes: Option<i32>) -> DailyLog {
        DailyLog {
            workout_completed: true,
            workout_time_minutes: minutes,
            ..log(log_date)
        }
    }

    #[test]
    fn test_active_goal_count() {
        let goals = vec![
            goal(GoalStatus::Active),
            goal(GoalStatus::Active),
            goal(GoalStatus::Completed),
        ];
        let stats = calculate_stats(&goals, &[], wednesday());
        assert_eq!(stats.active_goals, 2);
        assert_eq!(stats.goals_completed_this_week, 1);
    }

    #[test]
    fn test_empty_inputs_are_all_zero() {
        let stats = calculate_stats(&[], &[], wednesday());
        assert_eq!(stats.active_goals, 0);
        assert_eq!(stats.weekly_workouts, "0/3");
        assert_eq!(stats.avg_workout_minutes, 0);
        assert_eq!(stats.calories_this_week, 0);
        assert_eq!(stats.calories_trend, 0);
        assert_eq!(stats.water_this_week, 0);
        assert_eq!(stats.water_trend, 0);
    }

    #[test]
    fn test_calories_average_and_trend() {
        let logs = vec![
            calories(date(9), 2000),
            calories(date(10), 2200),
            calories(date(3), 2000),
            calories(date(4), 2000),
        ];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.calories_this_week, 2100);
        assert_eq!(stats.calories_trend, 5);
    }

    #[test]
    fn test_negative_trend_keeps_sign() {
        let logs = vec![water(date(9), 1500), water(date(2), 2000)];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.water_this_week, 1500);
        assert_eq!(stats.water_trend, -25);
    }

    #[test]
    fn test_no_logs_this_week_means_zero_trend() {
        let logs = vec![calories(date(3), 2500), calories(date(5), 1800)];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.calories_this_week, 0);
        assert_eq!(stats.calories_trend, 0);
    }

    #[test]
    fn test_no_baseline_means_zero_trend() {
        let logs = vec![water(date(9), 2000), water(date(10), 2400)];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.water_this_week, 2200);
        assert_eq!(stats.water_trend, 0);
    }

    #[test]
    fn test_zero_baseline_means_zero_trend() {
        let logs = vec![
            calories(date(2), 0),
            calories(date(4), 0),
            calories(date(9), 1800),
            calories(date(10), 2200),
        ];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.calories_this_week, 2000);
        assert_eq!(stats.calories_trend, 0);
    }

    #[test]
    fn test_null_metrics_excluded_from_average() {
        // A log without calories must not drag the average toward zero.
        let logs = vec![calories(date(9), 1800), log(date(10)), calories(date(11), 2200)];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.calories_this_week, 2000);
    }

    #[test]
    fn test_weekly_workouts_uses_elapsed_days() {
        let logs = vec![workout(date(9), Some(30)), workout(date(10), Some(45))];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.weekly_workouts, "2/3");
    }

    #[test]
    fn test_weekly_workouts_ignores_last_week() {
        let logs = vec![workout(date(8), Some(30)), workout(date(9), Some(30))];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.weekly_workouts, "1/3");
    }

    #[test]
    fn test_sunday_denominator_is_seven() {
        let sunday = date(15).and_hms_opt(9, 0, 0).unwrap();
        let stats = calculate_stats(&[], &[workout(date(15), None)], sunday);
        assert_eq!(stats.weekly_workouts, "1/7");
    }

    #[test]
    fn test_avg_workout_minutes_only_completed_with_time() {
        let logs = vec![
            workout(date(9), Some(30)),
            workout(date(10), Some(45)),
            workout(date(11), None),
            DailyLog {
                workout_time_minutes: Some(120),
                ..log(date(11))
            },
        ];
        let stats = calculate_stats(&[], &logs, wednesday());
        // (30 + 45) / 2 = 37.5 rounds away from zero
        assert_eq!(stats.avg_workout_minutes, 38);
    }

    #[test]
    fn test_logs_outside_window_ignored() {
        let logs = vec![calories(date(1), 9000), calories(date(16), 9000)];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.calories_this_week, 0);
        assert_eq!(stats.calories_trend, 0);
    }

    #[test]
    fn test_trend_rounds_final_value_only() {
        // this week averages 1001.5, last week 1000
        let logs = vec![
            calories(date(9), 1000),
            calories(date(10), 1003),
            calories(date(2), 1000),
        ];
        let stats = calculate_stats(&[], &logs, wednesday());
        assert_eq!(stats.calories_this_week, 1002); // 1001.5 rounds up
        assert_eq!(stats.calories_trend, 0); // 0.15% rounds to 0
    }

    #[test]
    fn test_idempotent() {
        let goals = vec![goal(GoalStatus::Active), goal(GoalStatus::Paused)];
        let logs: Vec<DailyLog> = (0..14)
            .map(|i| {
                let d = date(2) + Duration::days(i);
                DailyLog {
                    workout_completed: i % 2 == 0,
                    workout_time_minutes: Some(20 + i as i32),
                    calories_consumed: Some(1800 + 10 * i as i32),
                    water_ml: Some(1500 + 50 * i as i32),
                    ..log(d)
                }
            })
            .collect();
        let a = calculate_stats(&goals, &logs, wednesday());
        let b = calculate_stats(&goals, &logs, wednesday());
        assert_eq!(a, b);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(calculate_stats(&[], &[], wednesday())).unwrap();
        assert_eq!(json["activeGoals"], 0);
        assert_eq!(json["weeklyWorkouts"], "0/3");
        assert_eq!(json["avgWorkoutMinutes"], 0);
        assert_eq!(json["caloriesTrend"], 0);
        assert_eq!(json["caloriesThisWeek"], 0);
        assert_eq!(json["waterTrend"], 0);
        assert_eq!(json["waterThisWeek"], 0);
        assert_eq!(json["goalsCompletedThisWeek"], 0);
    }
}
