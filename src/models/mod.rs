pub mod daily_log;
pub mod goal;
pub mod profile;
pub mod user;
