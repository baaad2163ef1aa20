use thiserror::Error;

/// Errors that can occur while running the quadratic tutor.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Streaming error: {0}")]
    Streaming(String),
}

impl Error {
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Error::RemoteService(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn streaming(message: impl Into<String>) -> Self {
        Error::Streaming(message.into())
    }

    /// Fold transport-level failures into the remote service kind.
    ///
    /// Authentication and input errors keep their kind so the caller can
    /// tell a rejected key from a flaky network.
    pub fn into_remote(self) -> Self {
        match self {
            Error::Http(e) => Error::RemoteService(e.to_string()),
            Error::Serialization(e) => Error::RemoteService(format!("malformed response: {e}")),
            Error::Streaming(message) => Error::RemoteService(message),
            other => other,
        }
    }

    /// Whether the interaction can simply be retried by the user.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_folds_into_remote() {
        let error = Error::streaming("connection reset").into_remote();
        assert!(matches!(error, Error::RemoteService(ref m) if m == "connection reset"));
    }

    #[test]
    fn test_authentication_kept_by_into_remote() {
        let error = Error::authentication("bad key").into_remote();
        assert!(matches!(error, Error::Authentication(_)));
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::remote("503").is_recoverable());
        assert!(Error::invalid_input("empty").is_recoverable());
        assert!(!Error::config("bad base_url").is_recoverable());
    }
}
