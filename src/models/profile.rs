use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<f64>,
    pub gender: Option<Gender>,
    pub fitness_level: Option<FitnessLevel>,
    pub is_demo: bool,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "fitness_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// PUT /api/profile. The profile form always submits every field, so
/// omitted values are stored as NULL.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[validate(range(min = 50, max = 300, message = "Height must be 50-300 cm"))]
    pub height_cm: Option<i32>,
    #[validate(range(min = 1.0, max = 700.0, message = "Weight must be 1-700 kg"))]
    pub weight_kg: Option<f64>,
    pub gender: Option<Gender>,
    pub fitness_level: Option<FitnessLevel>,
    pub onboarding_complete: Option<bool>,
}
