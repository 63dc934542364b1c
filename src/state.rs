//! Published session state
//!
//! Both values live in `watch` channels so a new subscriber sees the current
//! value immediately, then every change after it.

use crate::types::UserPayload;
use tokio::sync::watch;

pub struct AuthState {
    authenticated: watch::Sender<bool>,
    user: watch::Sender<Option<UserPayload>>,
}

impl AuthState {
    pub fn new(authenticated: bool, user: Option<UserPayload>) -> Self {
        let (authenticated, _) = watch::channel(authenticated);
        let (user, _) = watch::channel(user);
        Self {
            authenticated,
            user,
        }
    }

    pub fn publish_authenticated(&self, user: Option<UserPayload>) {
        self.user.send_replace(user);
        self.authenticated.send_replace(true);
    }

    pub fn publish_signed_out(&self) {
        self.user.send_replace(None);
        self.authenticated.send_replace(false);
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    pub fn current_user(&self) -> Option<UserPayload> {
        self.user.borrow().clone()
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<UserPayload>> {
        self.user.subscribe()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new(false, None)
    }
}
