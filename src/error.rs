//! Error taxonomy shared by the link registry and the analytics aggregator.
//!
//! Storage failures are logged where they are wrapped; the wrapped error is
//! kept as a source for diagnostics but never rendered in `Display`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("short code '{0}' is already taken")]
    Conflict(String),

    #[error("unable to generate a unique short code after {0} attempts")]
    Exhausted(usize),

    #[error("short link not found")]
    NotFound,

    #[error("storage operation failed")]
    Storage(#[source] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Log the underlying failure and wrap it without exposing its detail.
    pub(crate) fn storage(operation: &'static str, err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        tracing::error!(operation, error = %err, "storage failure");
        ServiceError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_hides_detail() {
        let err = ServiceError::storage("test", anyhow::anyhow!("connection refused at 10.0.0.5"));
        assert_eq!(err.to_string(), "storage operation failed");
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn test_conflict_names_code() {
        let err = ServiceError::Conflict("promo".to_string());
        assert_eq!(err.to_string(), "short code 'promo' is already taken");
    }
}
