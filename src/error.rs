use std::time::Duration;

/// Failures raised by the spatial store while a stage is executing.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("missing input relation {0}")]
    MissingInput(String),

    #[error("statement timed out after {0:?}")]
    Timeout(Duration),

    #[error("relation {0} already exists")]
    AlreadyExists(String),

    #[error("injected failure: {0}")]
    Injected(String),

    #[cfg(feature = "database")]
    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// Error taxonomy for region handling, reprojection, stage execution and slope queries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid region {name}: {reason}")]
    Validation { name: String, reason: String },

    #[error("area {area:.2} km² of region {name} exceeds maximum {max:.2} km²")]
    AreaExceeded { name: String, area: f64, max: f64 },

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("structural parameter {value:?} rejected: {reason}")]
    SanitizationRejected { value: String, reason: &'static str },

    #[error("stage {stage} references the region name but no region was supplied")]
    RegionRequired { stage: String },

    #[error("stage {stage} has no value bound for :{name}")]
    UnboundParameter { stage: String, name: String },

    #[error("stage {stage} uses structural placeholder {{{{{name}}}}} outside the allow-list")]
    UnknownPlaceholder { stage: String, name: String },

    #[error("stage {stage} reads {table} before the stage that writes it")]
    OutOfOrder { stage: String, table: String },

    #[error("stage {stage} failed after {elapsed:?} with parameters {params}; rolled back: {source}")]
    StoreExecution {
        stage: String,
        elapsed: Duration,
        params: String,
        #[source]
        source: StoreError,
    },

    #[error("slope range inverted: min {min} > max {max}")]
    RangeInverted { min: f64, max: f64 },

    #[error("configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("query failed: {0}")]
    Query(#[from] tokio_postgres::Error),
}

impl Error {
    pub fn validation(name: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
