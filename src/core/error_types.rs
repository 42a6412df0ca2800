//! Shared constants for structured API errors.

use std::fmt;

/// Error `type` reported in every error envelope.
pub const ERROR_TYPE_INVALID_REQUEST: &str = "invalid_request_error";

pub const ERROR_CATEGORY_UPSTREAM_4XX: &str = "upstream_4xx";
pub const ERROR_CATEGORY_UPSTREAM_5XX: &str = "upstream_5xx";
pub const ERROR_CATEGORY_TIMEOUT: &str = "timeout";
pub const ERROR_CATEGORY_CONNECT_ERROR: &str = "connect_error";
pub const ERROR_CATEGORY_NETWORK_ERROR: &str = "network_error";
pub const ERROR_CATEGORY_INVALID_BODY: &str = "invalid_body";
pub const ERROR_CATEGORY_INTERNAL_ERROR: &str = "internal_error";

/// Failure category used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategoryCode {
    Upstream4xx,
    Upstream5xx,
    Timeout,
    ConnectError,
    NetworkError,
    InvalidBody,
    InternalError,
}

impl ErrorCategoryCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upstream4xx => ERROR_CATEGORY_UPSTREAM_4XX,
            Self::Upstream5xx => ERROR_CATEGORY_UPSTREAM_5XX,
            Self::Timeout => ERROR_CATEGORY_TIMEOUT,
            Self::ConnectError => ERROR_CATEGORY_CONNECT_ERROR,
            Self::NetworkError => ERROR_CATEGORY_NETWORK_ERROR,
            Self::InvalidBody => ERROR_CATEGORY_INVALID_BODY,
            Self::InternalError => ERROR_CATEGORY_INTERNAL_ERROR,
        }
    }

    /// Category for an upstream HTTP status.
    pub const fn from_upstream_status(status: u16) -> Self {
        if status >= 500 {
            Self::Upstream5xx
        } else {
            Self::Upstream4xx
        }
    }
}

impl fmt::Display for ErrorCategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
