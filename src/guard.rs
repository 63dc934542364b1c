//! Navigation guard for protected views

use crate::session::AuthStatus;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_LOGIN_ROUTE: &str = "/dashboard/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigation blocked; go to this route instead
    Redirect(String),
}

pub struct AuthGuard {
    status: Arc<dyn AuthStatus>,
    login_route: String,
}

impl AuthGuard {
    pub fn new(status: Arc<dyn AuthStatus>) -> Self {
        Self::with_login_route(status, DEFAULT_LOGIN_ROUTE)
    }

    pub fn with_login_route(status: Arc<dyn AuthStatus>, login_route: impl Into<String>) -> Self {
        Self {
            status,
            login_route: login_route.into(),
        }
    }

    /// Read the auth flag once and decide
    pub fn can_activate(&self, route: &str) -> GuardDecision {
        if self.status.auth_flag() {
            GuardDecision::Allow
        } else {
            info!(route = %route, redirect = %self.login_route, "Access denied, redirecting to login");
            GuardDecision::Redirect(self.login_route.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthStatusFixed;

    #[test]
    fn test_allows_when_authenticated() {
        let guard = AuthGuard::new(Arc::new(AuthStatusFixed(true)));
        assert_eq!(guard.can_activate("/dashboard/profile"), GuardDecision::Allow);
    }

    #[test]
    fn test_redirects_when_signed_out() {
        let guard = AuthGuard::new(Arc::new(AuthStatusFixed(false)));
        assert_eq!(
            guard.can_activate("/dashboard/profile"),
            GuardDecision::Redirect("/dashboard/login".to_string())
        );

        let guard = AuthGuard::with_login_route(Arc::new(AuthStatusFixed(false)), "/login");
        assert_eq!(
            guard.can_activate("/admin"),
            GuardDecision::Redirect("/login".to_string())
        );
    }
}
