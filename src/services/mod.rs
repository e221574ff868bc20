pub mod avatar_storage;
pub mod dashboard;
pub mod goal_progress;
pub mod stats;
pub mod week;
