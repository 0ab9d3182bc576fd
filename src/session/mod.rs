//! Session state machine: the single writer of "who is signed in"
//!
//! State moves Anonymous -> Authenticated on a successful sign-in, sign-up,
//! or externally supplied hydration, and back to Anonymous on explicit
//! logout or on any unauthorized response the request pipeline observes on a
//! protected endpoint. There is no intermediate refreshing state.

mod types;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::error::Error;
use crate::http::ApiClient;
use crate::token::TokenService;

pub use types::*;

const SIGN_IN_PATH: &str = "/auth/signin";
const SIGN_UP_PATH: &str = "/auth/signup";
const SIGN_OUT_PATH: &str = "/auth/signout";
const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";

/// Shared session container. Crate-private on purpose: the session service
/// and the pipeline's unauthorized path are the only writers; everything else
/// subscribes.
pub(crate) struct SessionShared {
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    tokens: TokenService,
}

impl SessionShared {
    pub(crate) fn new(tokens: TokenService) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::default());
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state,
            events,
            tokens,
        })
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn set_user(&self, user: User) {
        self.state.send_replace(SessionState {
            current_user: Some(user),
            is_authenticated: true,
        });
    }

    /// Local clear shared by logout and forced termination: credentials gone,
    /// state back to Anonymous.
    fn clear_local(&self) {
        self.tokens.clear_tokens();
        self.state.send_replace(SessionState::default());
    }

    /// Forced termination, invoked by the request pipeline on a 401.
    pub(crate) fn terminate(&self) {
        log::info!("session terminated by unauthorized response");
        self.clear_local();
        let _ = self.events.send(SessionEvent::Terminated);
    }

    fn signed_out(&self) {
        self.clear_local();
        let _ = self.events.send(SessionEvent::SignedOut);
    }
}

/// Session operations and reads for the rest of the application
pub struct SessionService {
    api: ApiClient,
    shared: Arc<SessionShared>,
}

impl SessionService {
    pub(crate) fn new(api: ApiClient, shared: Arc<SessionShared>) -> Self {
        Self { api, shared }
    }

    /// Sign in with email and password.
    ///
    /// On success the session becomes authenticated in a single transition.
    /// On failure the state is left untouched and the error is re-raised
    /// after central logging. Tokens are not written to the credential store
    /// here; the server's cookie session carries authentication.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User, Error> {
        let result = self
            .api
            .post(SIGN_IN_PATH)
            .json(credentials)?
            .send::<AuthResponse>()
            .await;
        self.enter_authenticated("sign-in", result)
    }

    /// Register a new account; on success the session becomes authenticated.
    pub async fn sign_up(&self, data: &SignUpData) -> Result<User, Error> {
        let result = self
            .api
            .post(SIGN_UP_PATH)
            .json(data)?
            .send::<AuthResponse>()
            .await;
        self.enter_authenticated("sign-up", result)
    }

    fn enter_authenticated(
        &self,
        operation: &str,
        result: Result<Option<AuthResponse>, Error>,
    ) -> Result<User, Error> {
        match result {
            Ok(Some(auth)) => {
                self.shared.set_user(auth.user.clone());
                Ok(auth.user)
            }
            // Public endpoints are exempt from 401 suppression, so an empty
            // outcome cannot happen here; treat it as a terminated session.
            Ok(None) => Err(Error::auth("session terminated")),
            Err(err) => {
                log::warn!("{} failed: {}", operation, err);
                Err(err)
            }
        }
    }

    /// Request a password-reset email. Pass-through; no state mutation.
    pub async fn reset_password(&self, request: &PasswordReset) -> Result<(), Error> {
        self.api
            .post(FORGOT_PASSWORD_PATH)
            .json(request)?
            .send_unit()
            .await?;
        Ok(())
    }

    /// Change a user's password. Pass-through; no state mutation.
    pub async fn change_password(
        &self,
        user_id: &str,
        change: &PasswordChange,
    ) -> Result<(), Error> {
        self.api
            .put(&format!("/users/{}/password", user_id))
            .json(change)?
            .send_unit()
            .await?;
        Ok(())
    }

    /// Update a user's profile. When the updated user is the one currently
    /// signed in, the cached session copy is re-synchronized.
    ///
    /// `Ok(None)` means the session was terminated while the call was in
    /// flight.
    pub async fn update_profile(
        &self,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Result<Option<User>, Error> {
        let updated = self
            .api
            .put(&format!("/users/{}", user_id))
            .json(attributes)?
            .send::<User>()
            .await?;
        if let Some(user) = &updated {
            let is_current = self
                .shared
                .snapshot()
                .current_user
                .map(|current| current.id == user.id)
                .unwrap_or(false);
            if is_current {
                self.shared.set_user(user.clone());
            }
        }
        Ok(updated)
    }

    /// Sign out. Local state and stored credentials are cleared regardless of
    /// whether the server-side logout call succeeds; a network failure is
    /// still reported to the caller afterwards.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = self.api.post(SIGN_OUT_PATH).send_unit().await;
        self.shared.signed_out();
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                log::warn!("sign-out request failed: {}", err);
                Err(err)
            }
        }
    }

    /// Enter the authenticated state with an externally supplied user, e.g.
    /// one restored from [`TokenService::stored_user`] by the host at start.
    pub fn hydrate_user(&self, user: User) {
        self.shared.set_user(user);
    }

    /// The signed-in user, if any. Synchronous read of the latest state.
    pub fn current_user(&self) -> Option<User> {
        self.shared.snapshot().current_user
    }

    /// Whether the session is currently authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.shared.snapshot().is_authenticated
    }

    /// Latest state plus all future transitions, as a read-only stream.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Lifecycle notifications ([`SessionEvent::Terminated`],
    /// [`SessionEvent::SignedOut`]).
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }
}
