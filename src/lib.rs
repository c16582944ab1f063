pub mod config;
pub mod db;
pub mod models;
pub mod monitor;
pub mod notifiers;
pub mod price;
pub mod scheduler;
pub mod sources;
pub mod utils;
pub mod watches;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
