//! Route guards gating navigation on session state
//!
//! Guards are pure: they read the latest session state and answer, with no
//! side effect beyond the redirect they request.

use crate::session::SessionState;

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation may proceed
    Allow,
    /// Navigation is denied; the host should redirect to the given route
    Redirect(String),
}

/// Allows navigation only for authenticated sessions
pub struct AuthGuard {
    sign_in_route: String,
}

impl AuthGuard {
    pub fn new(sign_in_route: &str) -> Self {
        Self {
            sign_in_route: sign_in_route.to_string(),
        }
    }

    pub fn check(&self, state: &SessionState) -> GuardDecision {
        if state.is_authenticated {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(self.sign_in_route.clone())
        }
    }
}

/// Allows navigation only for anonymous sessions (sign-in, sign-up screens)
pub struct GuestGuard {
    home_route: String,
}

impl GuestGuard {
    pub fn new(home_route: &str) -> Self {
        Self {
            home_route: home_route.to_string(),
        }
    }

    pub fn check(&self, state: &SessionState) -> GuardDecision {
        if state.is_authenticated {
            GuardDecision::Redirect(self.home_route.clone())
        } else {
            GuardDecision::Allow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;

    fn authenticated() -> SessionState {
        SessionState {
            current_user: Some(User {
                id: "u-1".to_string(),
                first_name: "Claire".to_string(),
                last_name: "Moreau".to_string(),
                email: "claire@etude.example".to_string(),
                phone: None,
                profile: None,
                online: false,
                marital_status: None,
                created_at: None,
                updated_at: None,
            }),
            is_authenticated: true,
        }
    }

    #[test]
    fn auth_guard_allows_authenticated_and_redirects_anonymous() {
        let guard = AuthGuard::new("/signin");
        assert_eq!(guard.check(&authenticated()), GuardDecision::Allow);
        assert_eq!(
            guard.check(&SessionState::default()),
            GuardDecision::Redirect("/signin".to_string())
        );
    }

    #[test]
    fn guest_guard_is_the_inverse() {
        let guard = GuestGuard::new("/dashboard");
        assert_eq!(guard.check(&SessionState::default()), GuardDecision::Allow);
        assert_eq!(
            guard.check(&authenticated()),
            GuardDecision::Redirect("/dashboard".to_string())
        );
    }
}
