//! Tabellion Client Core
//!
//! The client core of the Tabellion notarial practice console: session state,
//! credential storage, the authenticated request pipeline, and route guards.
//!
//! Feature services (clients, dossiers, documents, payments, appointments,
//! signatures) build on this crate. They consume exactly two things: a way to
//! issue an HTTP call that is automatically credentialed and uniformly
//! error-reported ([`http::ApiClient`]), and a readable signal of who is
//! signed in ([`session::SessionService`]). They never touch the credential
//! store or the pipeline internals directly.

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod session;
pub mod store;
pub mod token;

use std::sync::Arc;

use crate::config::ClientOptions;
use crate::guard::{AuthGuard, GuestGuard};
use crate::http::{ApiClient, LoadingTracker};
use crate::session::{SessionService, SessionShared};
use crate::store::{CredentialStore, MemoryStore};
use crate::token::TokenService;

/// The main entry point for the Tabellion client core
pub struct Tabellion {
    /// Request pipeline shared by all feature services
    pub api: ApiClient,
    /// Session state machine
    pub session: SessionService,
    store: Arc<CredentialStore>,
    tokens: TokenService,
    options: ClientOptions,
}

impl Tabellion {
    /// Create a new client against an API base URL and a file-server base URL
    ///
    /// # Example
    ///
    /// ```
    /// use tabellion_client::Tabellion;
    ///
    /// let client = Tabellion::new(
    ///     "https://api.tabellion.example",
    ///     "https://files.tabellion.example",
    /// );
    /// ```
    pub fn new(api_url: &str, files_url: &str) -> Self {
        Self::new_with_options(api_url, files_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(api_url: &str, files_url: &str, options: ClientOptions) -> Self {
        Self::new_with_store(
            api_url,
            files_url,
            options,
            CredentialStore::durable(MemoryStore::new()),
        )
    }

    /// Create a new client with an explicitly selected credential storage
    /// backend, e.g. [`CredentialStore::cookie_only`] for server-rendered
    /// execution. Backend selection happens once, here; nothing downstream
    /// branches on the environment again.
    pub fn new_with_store(
        api_url: &str,
        files_url: &str,
        options: ClientOptions,
        store: CredentialStore,
    ) -> Self {
        let store = Arc::new(store);
        let tokens = TokenService::new(store.clone());
        let shared = SessionShared::new(tokens.clone());
        let api = ApiClient::new(api_url, files_url, &options, shared.clone());
        let session = SessionService::new(api.clone(), shared);

        Self {
            api,
            session,
            store,
            tokens,
            options,
        }
    }

    /// The request pipeline
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The session state machine
    pub fn session(&self) -> &SessionService {
        &self.session
    }

    /// Typed access/refresh-token and user-snapshot storage
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The underlying credential store (cookie header rendering for
    /// server-rendered hosts lives here)
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The global loading indicator
    pub fn loading(&self) -> &LoadingTracker {
        self.api.loading()
    }

    /// Guard for routes that require an authenticated session
    pub fn auth_guard(&self) -> AuthGuard {
        AuthGuard::new(&self.options.sign_in_route)
    }

    /// Guard for routes reserved to anonymous sessions
    pub fn guest_guard(&self) -> GuestGuard {
        GuestGuard::new(&self.options.home_route)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::guard::{AuthGuard, GuardDecision, GuestGuard};
    pub use crate::session::{Credentials, SessionEvent, SessionState, User};
    pub use crate::Tabellion;
}
