// ABOUTME: Error taxonomy for notes-session operations
// ABOUTME: Maps HTTP statuses from the auth and notes services onto SessionError kinds

use thiserror::Error;

/// Errors surfaced to callers of the session layer.
///
/// Every failure that reaches a caller is one of these kinds, never a raw
/// transport error. The enum is `Clone` so one refresh outcome can be handed
/// to every call that waited on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Malformed request body, rejected by the server.
    #[error("validation error: {0}")]
    Validation(String),

    /// Bad credentials, missing/expired access token or rejected refresh token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Authenticated but not allowed to touch the target resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Transport failure, no response received.
    #[error("network error: {0}")]
    Network(String),

    /// A status code the client has no mapping for.
    #[error("unexpected server response {status}: {message}")]
    UnknownServer { status: u16, message: String },

    /// A success response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Token store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Which endpoint family produced a failing status.
///
/// The same status means different things depending on who answered: the
/// auth service rejects bad credentials with 400, while the notes service
/// uses 400 for a malformed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    /// `register`, `forgot-password`, `reset-password`
    Account,
    /// `login`, `refresh-token`
    Credentials,
    /// Any call against the notes service
    Resource,
}

impl SessionError {
    /// Build an error from a non-success status and the response body text.
    pub fn from_status(status: u16, body: &str, context: ErrorContext) -> Self {
        let message = status_message(status, body);

        match (context, status) {
            (_, 401) => Self::Auth(message),
            (ErrorContext::Credentials, 400) => Self::Auth(message),
            (_, 403) => Self::Forbidden(message),
            (ErrorContext::Resource, 404) => Self::NotFound(message),
            (ErrorContext::Resource, 400 | 422) => Self::Validation(message),
            (ErrorContext::Account, 400..=499) => Self::Validation(message),
            (ErrorContext::Credentials, 404) => Self::NotFound(message),
            _ => Self::UnknownServer { status, message },
        }
    }

    /// True for the kind that ends a session: bad or expired credentials.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// The HTTP status that identifies this kind, when it came from a server.
    ///
    /// Every `Auth` reports 401, including credential rejections the auth
    /// service answers with 400.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::UnknownServer { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<url::ParseError> for SessionError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid url: {err}"))
    }
}

fn status_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("no response body")
        .to_string()
}
