use thiserror::Error;

/// Validation failures for transaction records at creation time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("service name must not be empty")]
    EmptyService,

    #[error("transaction amount must be non-negative, got {0}")]
    NegativeAmount(f64),

    #[error("transaction amount must be a finite number")]
    NonFiniteAmount,
}
