//! Backend result codes and the client-facing error messages.

/// Result codes the backend puts in the envelope's `code` field.
pub mod codes {
    /// Request succeeded.
    pub const SUCCESS: &str = "api.ok";

    /// The backend is in maintenance mode. The whole envelope is the
    /// maintenance notice to display.
    pub const MAINTENANCE: &str = "api.maintenance";

    /// `GET groups/{id}/terms` on a group without terms. Treated as an empty
    /// result rather than a failure.
    pub const GROUP_TERMS_NOT_FOUND: &str = "group.terms.not_found";
}

/// User-facing messages for failures that do not come from the server.
pub mod messages {
    pub const UNEXPECTED: &str = "An Unexpected Error Occurred";
    pub const NO_RESPONSE: &str = "Request Timeout";
    pub const MISSING_CONFIGURATION: &str = "Request Configuration Error";
    pub const SESSION_INVALID: &str = "Session Expired Or Invalid";
}

/// HTTP status that signals an expired or missing session.
pub const HTTP_UNAUTHORIZED: u16 = 401;
