//! Configuration options for the Tabellion client

use std::time::Duration;

/// Configuration options for the Tabellion client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Route the auth guard redirects anonymous users to
    pub sign_in_route: String,

    /// Route the guest guard redirects authenticated users to
    pub home_route: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            sign_in_route: "/signin".to_string(),
            home_route: "/dashboard".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientOptions {
    /// Set the sign-in route used for guard redirects
    pub fn with_sign_in_route(mut self, value: &str) -> Self {
        self.sign_in_route = value.to_string();
        self
    }

    /// Set the authenticated landing route used for guard redirects
    pub fn with_home_route(mut self, value: &str) -> Self {
        self.home_route = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }
}
