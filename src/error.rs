//! Error types for the client, the serializers and the vector store.

use serde_json::Value;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection timed out: {0}")]
    ConnectionTimeout(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Bulk indexing failed for {failed} document(s): {first_error}")]
    Bulk { failed: usize, first_error: String },
}

impl Error {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(e) => Some(e.status),
            _ => None,
        }
    }

    /// Shorthand for `matches!(err, Error::Api(e) if e.kind == kind)`.
    pub fn is_api(&self, kind: ApiErrorKind) -> bool {
        matches!(self, Error::Api(e) if e.kind == kind)
    }
}

/// Payload could not be encoded or decoded.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Unable to serialize {value} (type: {type_name})")]
    Unsupported { value: String, type_name: &'static str },

    #[error("Cannot serialize {0} into {1}")]
    WrongBody(&'static str, &'static str),

    #[error("Unknown mimetype, unable to deserialize: {0}")]
    UnknownMimetype(String),

    #[error("Unable to decode {raw:?}: {source}")]
    Decode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Classification of an HTTP error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400
    BadRequest,
    /// 401
    Authentication,
    /// 403
    Authorization,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// Any status without a dedicated kind.
    Transport,
}

/// Status codes with a dedicated error kind. Everything else maps to
/// [`ApiErrorKind::Transport`].
pub const HTTP_EXCEPTIONS: &[(u16, ApiErrorKind)] = &[
    (400, ApiErrorKind::BadRequest),
    (401, ApiErrorKind::Authentication),
    (403, ApiErrorKind::Authorization),
    (404, ApiErrorKind::NotFound),
    (409, ApiErrorKind::Conflict),
];

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        HTTP_EXCEPTIONS
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, kind)| *kind)
            .unwrap_or(ApiErrorKind::Transport)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorKind::BadRequest => "RequestError",
            ApiErrorKind::Authentication => "AuthenticationException",
            ApiErrorKind::Authorization => "AuthorizationException",
            ApiErrorKind::NotFound => "NotFoundError",
            ApiErrorKind::Conflict => "ConflictError",
            ApiErrorKind::Transport => "TransportError",
        }
    }
}

/// Non-2xx response from the server.
#[derive(Error, Debug, Clone)]
#[error("{}({status}, '{message}')", .kind.as_str())]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
    /// Decoded error payload, when the body was JSON.
    pub info: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, info: Option<Value>) -> Self {
        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            message: message.into(),
            info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table_lookup() {
        assert_eq!(ApiErrorKind::from_status(400), ApiErrorKind::BadRequest);
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Authentication);
        assert_eq!(ApiErrorKind::from_status(403), ApiErrorKind::Authorization);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(409), ApiErrorKind::Conflict);
    }

    #[test]
    fn test_unknown_status_falls_back_to_transport() {
        assert_eq!(ApiErrorKind::from_status(500), ApiErrorKind::Transport);
        assert_eq!(ApiErrorKind::from_status(429), ApiErrorKind::Transport);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(404, "index_not_found_exception", None);
        assert_eq!(
            err.to_string(),
            "NotFoundError(404, 'index_not_found_exception')"
        );
    }

    #[test]
    fn test_error_status_helper() {
        let err: Error = ApiError::new(409, "version_conflict", None).into();
        assert_eq!(err.status(), Some(409));
        assert!(err.is_api(ApiErrorKind::Conflict));
        assert!(!err.is_api(ApiErrorKind::NotFound));
        assert_eq!(Error::InvalidArgument("x".into()).status(), None);
    }
}
