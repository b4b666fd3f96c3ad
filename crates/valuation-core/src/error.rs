use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}
