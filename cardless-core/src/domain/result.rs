//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error used as the preserved cause of transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error body returned by the API for a rejected request
///
/// Only ever built from a non-2xx response body.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{summary} (HTTP {status_code}): {detail}")]
pub struct ApiError {
    pub summary: String,
    pub detail: String,
    pub status_code: u16,
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// The API explicitly rejected the request
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Network failure, unparsable success body, or unparsable error body
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    /// A well-formed success response is missing a required field
    #[error("Contract violation: {message}")]
    ContractViolation {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A facade operation failed; `source` is the classified cause
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a transport error without an underlying cause
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            status: None,
            source: None,
        }
    }

    /// Create a transport error wrapping its cause
    pub fn transport_caused_by(
        msg: impl Into<String>,
        status: Option<u16>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Transport {
            message: msg.into(),
            status,
            source: Some(source.into()),
        }
    }

    /// Create a contract violation error
    pub fn contract(msg: impl Into<String>, source: Option<serde_json::Error>) -> Self {
        Self::ContractViolation {
            message: msg.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap this error with the facade operation that raised it
    pub fn in_operation(self, operation: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The classified error underneath any operation context
    pub fn cause(&self) -> &Error {
        match self {
            Error::Operation { source, .. } => source.cause(),
            other => other,
        }
    }

    /// The API-reported error, if that is what this is
    pub fn api_error(&self) -> Option<&ApiError> {
        match self.cause() {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    /// HTTP status associated with the failure, when one was received
    pub fn status(&self) -> Option<u16> {
        match self.cause() {
            Error::Api(api) => Some(api.status_code),
            Error::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.cause(), Error::Transport { .. })
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self.cause(), Error::ContractViolation { .. })
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
