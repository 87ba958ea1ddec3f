//! Error types for the campaign API client.
//!
//! # Design
//! Every failure surfaces as an `ApiError`. `kind()` collapses the variants
//! into the two categories callers branch on: the server answered with a
//! non-2xx status, or the exchange itself failed (network, encoding,
//! decoding).

use thiserror::Error;

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server responded outside the 200–299 range.
    Status,
    /// Network failure, or a body that could not be encoded or decoded.
    ParseOrNetwork,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. The body is discarded.
    #[error("HTTP error, status: {status}")]
    HttpStatus { status: u16 },

    /// The request could not be sent or the response could not be read.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON for the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::HttpStatus { .. } => ErrorKind::Status,
            ApiError::Transport(_) | ApiError::Deserialization(_) | ApiError::Serialization(_) => {
                ErrorKind::ParseOrNetwork
            }
        }
    }

    /// The HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
