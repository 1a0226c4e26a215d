//! Error types shared by the projection engine and the request layer

/// Failures raised by the projection engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// Non-positive price or frequency, bad horizon, or return rate <= -1
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A milestone year has no matching point in the series
    #[error("milestone year {year} is outside the projected range 1..={max_year}")]
    MilestoneOutOfRange { year: u32, max_year: u32 },
}

/// Failures raised while loading the item catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Csv(#[from] csv::Error),

    /// Row parsed but carries a value the catalog cannot hold
    #[error("invalid catalog row for item {id}: {reason}")]
    InvalidRow { id: u32, reason: String },
}

/// Failures raised while loading application configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced to callers of the request layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid or expired authorization code")]
    InvalidAuthCode,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ServiceError {
    /// HTTP status code the request layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Projection(ProjectionError::InvalidInput(_)) => 400,
            ServiceError::Validation(_) => 400,
            ServiceError::NotAuthenticated | ServiceError::InvalidAuthCode => 401,
            ServiceError::Projection(ProjectionError::MilestoneOutOfRange { .. }) => 500,
            ServiceError::Catalog(_) => 500,
        }
    }
}
