pub mod auth;
pub mod daily_logs;
pub mod dashboard;
pub mod demo;
pub mod goals;
pub mod health;
pub mod profile;
