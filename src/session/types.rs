//! Wire types for authentication and user management

use serde::{Deserialize, Serialize};

/// A user of the practice console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user ID
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Role tag within the practice ("notaire", "clerc", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Presence flag maintained by the server
    #[serde(default)]
    pub online: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Sign-in credentials
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload for registering a new console account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Password reset request
#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub email: String,
}

/// Password change payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// User attributes that can be updated
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
}

/// Response returned by the sign-in and sign-up endpoints.
///
/// The server drives authentication through its cookie session; the token
/// pair is present in the payload but is not persisted by the session
/// machinery (see [`crate::token::TokenService`] for the independent
/// bearer-token capability).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Observable session state
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The signed-in user, if any
    pub current_user: Option<User>,

    /// Whether a sign-in or hydration succeeded in this runtime
    pub is_authenticated: bool,
}

/// Session lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Forced termination after an unauthorized response on a protected
    /// endpoint. The request that observed the 401 resolves empty rather
    /// than erroring; this event is the observable trace.
    Terminated,

    /// Explicit sign-out
    SignedOut,
}
