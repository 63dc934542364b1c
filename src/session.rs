//! Session manager: token persistence, refresh and published auth state

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::jwt;
use crate::state::AuthState;
use crate::token_store::TokenStore;
use crate::types::*;
use async_singleflight::Group;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Macro to check HTTP response status and return a backend error if not successful
macro_rules! check_response {
    ($response:expr, $error_msg:expr) => {
        if !$response.status().is_success() {
            let status = $response.status();
            let text = $response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<$crate::types::ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message);
            tracing::warn!(status = %status, body = %text, "{}", $error_msg);
            return Err($crate::error::ClientError::Backend { status, message });
        }
    };
}
pub(crate) use check_response;

const REFRESH_KEY: &str = "refresh";

/// Read access to the published authentication flag
///
/// Implemented by [`SessionManager`]; guards only depend on this.
pub trait AuthStatus: Send + Sync + 'static {
    /// Current published value of the auth flag
    fn auth_flag(&self) -> bool;
}

/// Fixed auth status for tests or unauthenticated tooling
pub struct AuthStatusFixed(pub bool);

impl AuthStatus for AuthStatusFixed {
    fn auth_flag(&self) -> bool {
        self.0
    }
}

/// Session manager with persisted tokens and published auth state
pub struct SessionManager {
    config: ClientConfig,
    token_store: TokenStore,
    state: AuthState,
    http_client: Client,
    /// Singleflight group so concurrent callers share one refresh request
    /// Error type is String because singleflight requires shared error type
    refresh_singleflight: Group<Option<String>, String>,
}

impl SessionManager {
    /// Create a session manager over `token_store`
    ///
    /// The auth flag and user payload are computed from whatever tokens are
    /// already persisted.
    pub fn new(config: ClientConfig, token_store: TokenStore) -> Result<Arc<Self>> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let access = token_store.access_token()?;
        let authenticated = !jwt::is_expired_now(access.as_deref());
        let user = access.as_deref().and_then(|t| jwt::decode_claims(t).ok());

        debug!(
            api_url = %config.api_url,
            authenticated = %authenticated,
            "Session manager initialised from stored tokens"
        );

        Ok(Arc::new(Self {
            config,
            token_store,
            state: AuthState::new(authenticated, user),
            http_client,
            refresh_singleflight: Group::new(),
        }))
    }

    /// Log in with email and password
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let url = self.config.endpoint("/auth/login");
        let response = self.http_client.post(&url).json(credentials).send().await?;

        check_response!(response, "Login failed");

        let tokens: AuthResponse = response.json().await?;
        self.set_tokens(&tokens)?;
        info!(email = %credentials.email, "Logged in");

        Ok(tokens)
    }

    /// Register a new account; a successful signup also signs in
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        let url = self.config.endpoint("/auth/signup");
        let response = self.http_client.post(&url).json(request).send().await?;

        check_response!(response, "Signup failed");

        let tokens: AuthResponse = response.json().await?;
        self.set_tokens(&tokens)?;
        info!(email = %request.email, "Signed up");

        Ok(tokens)
    }

    /// Clear the session
    ///
    /// The backend is told to revoke the refresh token on a detached task;
    /// the local tokens are cleared whatever that call does.
    pub fn logout(&self) {
        match self.token_store.refresh_token() {
            Ok(Some(refresh_token)) => self.notify_logout(refresh_token),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not read refresh token during logout"),
        }

        if let Err(e) = self.token_store.clear() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
        self.state.publish_signed_out();
        info!("Logged out");
    }

    fn notify_logout(&self, refresh_token: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, skipping backend logout notification");
            return;
        };

        let client = self.http_client.clone();
        let url = self.config.endpoint("/auth/logout");
        handle.spawn(async move {
            let request = RefreshRequest { refresh_token };
            match client.post(&url).json(&request).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Backend logout acknowledged");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "Backend logout rejected");
                }
                Err(e) => {
                    warn!(error = %e, "Backend logout request failed");
                }
            }
        });
    }

    /// URL that starts the Google OAuth flow; the caller redirects to it
    pub fn google_login_url(&self) -> String {
        self.config.endpoint("/auth/google")
    }

    /// Store the token pair handed back by the OAuth redirect
    pub fn handle_google_callback(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.set_tokens(&AuthResponse {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        })?;
        info!("Google sign-in completed");
        Ok(())
    }

    /// Mint a new access token from the stored refresh token
    ///
    /// Returns `Ok(None)` when the refresh cannot complete (no refresh token,
    /// network or backend failure, storage failure); the session is then
    /// logged out.
    /// Concurrent callers share one request.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        let (success_opt, error_opt, _owner) = self
            .refresh_singleflight
            .work(REFRESH_KEY, async {
                self.do_refresh().await.map_err(|e| e.to_string())
            })
            .await;

        match (success_opt, error_opt) {
            (Some(token), None) => Ok(token),
            (None, Some(err_str)) => Err(ClientError::Authentication(err_str)),
            // Non-owner callers of a failed flight get nothing back
            _ => Ok(self.token_store.access_token()?.filter(|_| self.state.is_authenticated())),
        }
    }

    async fn do_refresh(&self) -> Result<Option<String>> {
        let refresh_token = match self.token_store.refresh_token() {
            Ok(Some(refresh_token)) => refresh_token,
            Ok(None) => {
                debug!("No refresh token stored, logging out");
                self.logout();
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Could not read refresh token, logging out");
                self.logout();
                return Ok(None);
            }
        };

        let url = self.config.endpoint("/auth/refresh-token");
        let request = RefreshRequest { refresh_token };

        let response = match self.http_client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed, logging out");
                self.logout();
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                error = %error_text,
                "Token refresh rejected, logging out"
            );
            self.logout();
            return Ok(None);
        }

        let refreshed: RefreshResponse = match response.json().await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(error = %e, "Malformed refresh response, logging out");
                self.logout();
                return Ok(None);
            }
        };

        if let Err(e) = self.token_store.set_access_token(&refreshed.access_token) {
            warn!(error = %e, "Could not store refreshed access token, logging out");
            self.logout();
            return Ok(None);
        }
        let user = jwt::decode_claims(&refreshed.access_token).ok();
        self.state.publish_authenticated(user);
        info!("Access token refreshed successfully");

        Ok(Some(refreshed.access_token))
    }

    /// Stored access token if still valid, otherwise a freshly refreshed one
    pub async fn valid_access_token(&self) -> Result<String> {
        if let Some(token) = self.token_store.access_token()? {
            if !jwt::is_expired_now(Some(&token)) {
                return Ok(token);
            }
        }

        self.refresh_token().await?.ok_or(ClientError::TokenExpired)
    }

    /// Lazy check: a non-expired access token is present in storage
    ///
    /// May disagree with the published flag, which is only updated on
    /// login, refresh and logout.
    pub fn is_authenticated(&self) -> bool {
        match self.token_store.access_token() {
            Ok(token) => !jwt::is_expired_now(token.as_deref()),
            Err(e) => {
                warn!(error = %e, "Could not read access token");
                false
            }
        }
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        self.token_store.access_token()
    }

    pub fn current_user(&self) -> Option<UserPayload> {
        self.state.current_user()
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<bool> {
        self.state.subscribe_auth()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<UserPayload>> {
        self.state.subscribe_user()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the token store (for advanced usage)
    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    fn set_tokens(&self, tokens: &AuthResponse) -> Result<()> {
        self.token_store.store(tokens)?;
        let user = match jwt::decode_claims(&tokens.access_token) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Access token claims could not be decoded");
                None
            }
        };
        self.state.publish_authenticated(user);
        Ok(())
    }
}

impl AuthStatus for SessionManager {
    fn auth_flag(&self) -> bool {
        self.state.is_authenticated()
    }
}
