mod daily_logs;
mod goals;
mod pool;
pub mod profiles;
pub mod repository;

pub use pool::create_pool;
#[cfg(test)]
pub use pool::lazy_pool;
pub use repository::Repository;
