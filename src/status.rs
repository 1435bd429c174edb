use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub enum Status {
    #[default]
    Ok,

    Internal(String),
    InvalidArgument(String),
    NotFound(String),

    /// Platform credential is no longer valid. The account must be re-linked.
    AuthExpired(String),
    Network(String),
    Timeout(String),
    RateLimited(String),

    /// Optimistic lock failure on a conditional write.
    Conflict(String),
}

impl Status {
    pub fn new(msg: &str, err: impl Error) -> Self {
        Status::Internal(format!("{msg}: '{err}'"))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Status::Internal(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Status::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Status::NotFound(msg.into())
    }

    pub fn auth_expired(msg: impl Into<String>) -> Self {
        Status::AuthExpired(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Status::Network(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Status::Timeout(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Status::RateLimited(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Status::Conflict(msg.into())
    }

    /// Errors in the "could not verify, try again" class.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Status::Network(_) | Status::Timeout(_) | Status::RateLimited(_)
        )
    }

    /// Maps a non-success HTTP response status from a remote API.
    pub fn from_http(code: StatusCode, url: &str) -> Self {
        match code {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Status::auth_expired(format!("{code} from {url}"))
            }
            StatusCode::TOO_MANY_REQUESTS => Status::rate_limited(format!("{code} from {url}")),
            StatusCode::NOT_FOUND => Status::not_found(format!("{code} from {url}")),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                Status::timeout(format!("{code} from {url}"))
            }
            code if code.is_server_error() => Status::network(format!("{code} from {url}")),
            code => Status::internal(format!("{code} from {url}")),
        }
    }
}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Self::new("IO error", err)
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Self::new("serde error", err)
    }
}

impl From<reqwest::Error> for Status {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|url| format!("{}{}", url.host_str().unwrap_or_default(), url.path()))
            .unwrap_or_default();
        let err = err.without_url();

        if err.is_timeout() {
            return Self::timeout(format!("reqwest timeout: '{err}' url: {url}"));
        }
        if let Some(code) = err.status() {
            return Self::from_http(code, &url);
        }
        match err.is_connect() || err.is_request() {
            true => Self::network(format!("reqwest error: '{err}'")),
            false => Self::new("reqwest error", err),
        }
    }
}

impl From<tokio::time::error::Elapsed> for Status {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::timeout(format!("deadline exceeded: '{err}'"))
    }
}

use firestore::errors::FirestoreError;
impl From<FirestoreError> for Status {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::DataNotFoundError(err) => Self::not_found(err.to_string()),
            FirestoreError::InvalidParametersError(err) => Self::invalid_argument(err.to_string()),
            FirestoreError::DataConflictError(err) => Self::conflict(err.to_string()),
            FirestoreError::NetworkError(err) => Self::network(err.to_string()),
            FirestoreError::DatabaseError(err) if err.retry_possible => {
                Self::network(err.to_string())
            }
            err => Self::new("firestore error", err),
        }
    }
}

impl Error for Status {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "Ok"),
            Status::Internal(msg) => write!(f, "Internal error: {msg}"),
            Status::InvalidArgument(msg) => write!(f, "Invalid argument error: {msg}"),
            Status::NotFound(msg) => write!(f, "Not found error: {msg}"),
            Status::AuthExpired(msg) => write!(f, "Auth expired error: {msg}"),
            Status::Network(msg) => write!(f, "Network error: {msg}"),
            Status::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            Status::RateLimited(msg) => write!(f, "Rate limited error: {msg}"),
            Status::Conflict(msg) => write!(f, "Conflict error: {msg}"),
        }
    }
}
