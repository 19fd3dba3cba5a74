//! The error type every client call returns.

use community_groups::SchemaError;
use community_groups_api::messages;
use serde_json::Value;

/// Why a request did not produce a result.
///
/// Transport and auth failures are normalised into these variants at the
/// dispatcher boundary; callers never see a raw `reqwest` error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered 401. A session-expired event has been emitted.
    #[error("unauthorized")]
    Unauthorized,

    /// The server is in maintenance mode. Carries the maintenance notice as
    /// sent by the server; the same notice is persisted in the local store.
    #[error("service is under maintenance")]
    MaintenanceMode(Value),

    /// The server rejected the request. `message` is the server's own
    /// explanation when it gave one.
    #[error("{message}")]
    ServerRejected { status: Option<u16>, message: String },

    /// No response arrived: connection failure or timeout.
    #[error("{}", messages::NO_RESPONSE)]
    NoResponse,

    /// A failure that fits none of the other shapes. The detail is logged,
    /// not shown.
    #[error("{}", messages::UNEXPECTED)]
    Unexpected(String),

    /// The response did not match the expected schema.
    #[error("response from {url} failed validation: {source}")]
    ValidationFailed {
        url: String,
        #[source]
        source: SchemaError,
    },

    /// No session token could be obtained for an authenticated call.
    #[error("{}", messages::SESSION_INVALID)]
    MissingAuth,

    /// The request could not be built (bad header value, unserialisable
    /// body).
    #[error("{}: {}", messages::MISSING_CONFIGURATION, .0)]
    InvalidRequest(String),
}

impl ApiError {
    /// Whether the caller should treat the session as gone.
    pub fn is_session_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::MissingAuth)
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        ApiError::ServerRejected {
            status: None,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_messages() {
        assert_eq!(ApiError::NoResponse.to_string(), "Request Timeout");
        assert_eq!(
            ApiError::Unexpected("boom".into()).to_string(),
            "An Unexpected Error Occurred"
        );
        assert_eq!(ApiError::MissingAuth.to_string(), "Session Expired Or Invalid");
    }

    #[test]
    fn server_message_is_shown_verbatim() {
        let e = ApiError::ServerRejected {
            status: Some(422),
            message: "Group name already taken".into(),
        };
        assert_eq!(e.to_string(), "Group name already taken");
        assert!(!e.is_session_error());
    }
}
