use serde::Deserialize;
use std::{error::Error as StdError, fmt};
use thiserror::Error;

/// Error returned by every [`ItemStore`](crate::ItemStore) operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Creating a table failed for a reason other than it already existing
    #[error("failed to provision table `{table}`: {source}")]
    Provisioning {
        table: String,
        #[source]
        source: ServiceError,
    },
    /// A record could not be mapped to or from DynamoDB attributes
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    /// A partial update targeted a key with no stored item
    #[error("no item with key ({partition}, {sort:?})")]
    NoSuchItem { partition: i64, sort: String },
    /// A partial update targeted one of the record's key attributes
    #[error("key attribute `{0}` cannot be updated")]
    ImmutableAttribute(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// The remote call itself failed
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Api(ApiError),
    #[error("transport error: {0}")]
    Transport(Box<dyn StdError + Send + Sync>),
    #[error("invalid request: {0}")]
    Request(#[from] http::Error),
    #[error("invalid request uri: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("endpoint `{0}` has no host")]
    InvalidEndpoint(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    #[error("failed to sign request: {0}")]
    Signing(String),
    #[error("malformed response body: {0}")]
    Response(#[source] serde_json::Error),
}

impl ServiceError {
    /// The DynamoDB error code, e.g. `ResourceNotFoundException`, when the service
    /// answered with one
    pub fn code(&self) -> Option<&str> {
        match self {
            ServiceError::Api(err) => Some(err.code.as_str()),
            _ => None,
        }
    }
}

/// Conversion between a record and its attribute map failed
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("missing attribute `{0}`")]
    MissingAttribute(String),
    #[error("attribute `{name}` is not of type {expected}")]
    UnexpectedType { name: String, expected: &'static str },
    #[error("attribute `{name}` holds an invalid number `{value}`")]
    InvalidNumber { name: String, value: String },
    #[error("attribute `{0}` is not a finite number")]
    NonFiniteNumber(String),
    #[error("attribute `{0}` is outside the range DynamoDB numbers can hold")]
    OutOfRange(String),
    #[error("`{0}` is not an attribute of this record")]
    UnknownAttribute(String),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// An error reported by DynamoDB in a non-200 response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    /// Error code with its `com.amazonaws...#` namespace removed
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

impl ApiError {
    pub(crate) fn from_response(
        status: u16,
        body: &str,
    ) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { kind, message }) => ApiError {
                status,
                code: kind.rsplit('#').next().unwrap_or_default().to_owned(),
                message,
            },
            Err(_) => ApiError {
                status,
                code: "Unknown".into(),
                message: body.to_owned(),
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status, self.message)
    }
}

impl StdError for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_strips_namespace() {
        let err = ApiError::from_response(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceInUseException","message":"Table already exists: Movies"}"#,
        );
        assert_eq!(err.code, "ResourceInUseException");
        assert_eq!(err.message, "Table already exists: Movies");
        assert_eq!(err.to_string(), "ResourceInUseException (400): Table already exists: Movies");
    }

    #[test]
    fn api_error_accepts_capitalized_message() {
        let err = ApiError::from_response(
            400,
            r#"{"__type":"com.amazon.coral.validate#ValidationException","Message":"bad key"}"#,
        );
        assert_eq!(err.code, "ValidationException");
        assert_eq!(err.message, "bad key");
    }

    #[test]
    fn api_error_keeps_unparseable_bodies() {
        let err = ApiError::from_response(503, "Service Unavailable");
        assert_eq!(err.code, "Unknown");
        assert_eq!(err.message, "Service Unavailable");
        assert_eq!(ServiceError::Api(err).code(), Some("Unknown"));
    }
}
