use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid price: {raw:?}")]
    InvalidPrice { raw: String },

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Price not found at {url} (selector: {selector})")]
    Extract { url: String, selector: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("{}", err))
    }
}

impl AppError {
    /// A record vanishing between listing and mutation is an expected
    /// outcome when request handlers share the store with the sweep.
    pub fn is_benign(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
