/// Error types for profit-curve analysis and the service around it.
///
/// Input violations (shape, label, probability, empty) are fatal for the
/// evaluation that raised them: no partial curve is ever returned.
/// Shell errors (config, database, channel) surface to the caller or the log.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("invalid label at index {index}: {value} (expected 0 or 1)")]
    InvalidLabel { index: usize, value: i64 },

    #[error("invalid probability at index {index}: {value} (expected finite value in [0, 1])")]
    InvalidProbability { index: usize, value: f64 },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("invalid cost-benefit matrix: {0}")]
    InvalidCostBenefit(String),

    #[error("input too large: {observations} observations (limit {limit})")]
    TooLarge { observations: usize, limit: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("evaluation task failed: {0}")]
    TaskFailed(String),
}

impl AnalysisError {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::ShapeMismatch { .. }
                | AnalysisError::InvalidLabel { .. }
                | AnalysisError::InvalidProbability { .. }
                | AnalysisError::EmptyInput(_)
                | AnalysisError::InvalidCostBenefit(_)
                | AnalysisError::TooLarge { .. }
                | AnalysisError::Parse(_)
        )
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for AnalysisError {
    fn from(e: rusqlite::Error) -> Self {
        AnalysisError::Database(e.to_string())
    }
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(e: tokio::task::JoinError) -> Self {
        AnalysisError::TaskFailed(e.to_string())
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(e: std::io::Error) -> Self {
        AnalysisError::Io(e.to_string())
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
