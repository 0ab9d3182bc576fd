//! Error handling for the Tabellion client core

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for the Tabellion client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or transport errors where no response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Structurally invalid or undecodable access token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Message reported by the server, or the raw body if none
        message: String,
        /// Canonical message suitable for direct display
        user_message: String,
    },

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new invalid-token error
    pub fn invalid_token<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidToken(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The message feature screens display to the user.
    ///
    /// Derived once, centrally: callers are expected to show this string and
    /// never to re-derive wording from the raw status code.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(_) => {
                "A connection error occurred. Check your network and try again.".to_string()
            }
            Error::Api { user_message, .. } => user_message.clone(),
            other => other.to_string(),
        }
    }

    /// Normalize a non-success response into the error taxonomy.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        let user_message = canonical_message(status, &message);
        Error::Api {
            status: status.as_u16(),
            message,
            user_message,
        }
    }
}

fn canonical_message(status: StatusCode, server_message: &str) -> String {
    match status.as_u16() {
        400 => "The request could not be processed.".to_string(),
        401 => "You are not authorized. Please sign in.".to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => "The requested resource could not be found.".to_string(),
        500 => "An internal server error occurred. Please try again later.".to_string(),
        code => format!("Unexpected error ({}): {}", code, server_message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_map_to_canonical_messages() {
        let err = Error::from_response(StatusCode::FORBIDDEN, "{}");
        assert_eq!(
            err.user_message(),
            "You do not have permission to perform this action."
        );

        let err = Error::from_response(StatusCode::NOT_FOUND, "not here");
        assert_eq!(err.user_message(), "The requested resource could not be found.");
    }

    #[test]
    fn unknown_status_falls_back_with_raw_detail() {
        let err = Error::from_response(
            StatusCode::IM_A_TEAPOT,
            r#"{"message":"short and stout"}"#,
        );
        assert_eq!(err.user_message(), "Unexpected error (418): short and stout");
        match err {
            Error::Api { status, message, .. } => {
                assert_eq!(status, 418);
                assert_eq!(message, "short and stout");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn server_message_extracted_from_json_body() {
        let err = Error::from_response(StatusCode::BAD_REQUEST, r#"{"message":"missing field"}"#);
        match err {
            Error::Api { message, .. } => assert_eq!(message, "missing field"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_kept_verbatim() {
        let err = Error::from_response(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        match err {
            Error::Api { message, .. } => assert_eq!(message, "boom"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
