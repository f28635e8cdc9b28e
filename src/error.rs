use thiserror::Error;

/// Boxed error produced by a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DataApiError {
    /// Failure reported by the remote execution surface, passed through untouched.
    #[error(transparent)]
    Transport(TransportError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Identifier error: {0}")]
    IdentifierError(String),

    #[error("Hydration error: {0}")]
    HydrationError(String),
}

impl DataApiError {
    /// Wrap a transport failure without altering it.
    pub fn transport(err: impl Into<TransportError>) -> Self {
        DataApiError::Transport(err.into())
    }

    /// Borrow the transport error, if this is one.
    #[must_use]
    pub fn as_transport(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DataApiError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<TransportError> for DataApiError {
    fn from(err: TransportError) -> Self {
        DataApiError::Transport(err)
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DataApiError>;
