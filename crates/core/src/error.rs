use thiserror::Error;

/// Main error type for fetch and conversion operations
#[derive(Error, Debug)]
pub enum EvadoError {
    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Response body could not be decoded to text
    #[error("Failed to decode response body: {0}")]
    DecodeError(String),

    /// No content could be extracted
    #[error("No content could be extracted from the document")]
    NoContent,

    /// Content is not readable (score below threshold)
    #[error("Content is not readable (score {score} below threshold {threshold})")]
    NotReaderable { score: f64, threshold: f64 },

    /// Every strategy in every tier failed
    #[error("All strategies failed for {url}: {}", format_attempts(.attempts))]
    AllStrategiesFailed {
        url: String,
        attempts: Vec<(String, String)>,
    },

    /// File write errors
    #[error("Failed to write output: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Render `(strategy, error)` pairs for the aggregated failure message
fn format_attempts(attempts: &[(String, String)]) -> String {
    attempts
        .iter()
        .map(|(strategy, error)| format!("{}: {}", strategy, error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for EvadoError
pub type Result<T> = std::result::Result<T, EvadoError>;
