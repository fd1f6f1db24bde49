use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("expected exactly {expected} rates, got {actual}")]
    RateCount { expected: usize, actual: usize },
}
