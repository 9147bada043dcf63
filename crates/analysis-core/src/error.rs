use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A computation needs more samples than are available. Window-level
    /// shortfalls degrade to null fields instead; this variant is for
    /// inputs too short to produce any meaningful report.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Structurally unusable input, e.g. a bar feed with no valid closes.
    /// Surfaced to the caller so a garbage report is never persisted.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}
