//! Storefront Rust Client
//!
//! A Rust client library for the storefront REST API: product listing and
//! detail, debounced search, polling refresh, and JWT session management
//! with persisted tokens, refresh and a navigation guard.

pub mod admin_login;
pub mod config;
pub mod detail;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod poll;
pub mod products;
pub mod search;
pub mod session;
pub mod state;
pub mod token_store;
pub mod types;

pub use admin_login::{AdminLogin, LoginForm};
pub use config::ClientConfig;
pub use detail::DetailQuery;
pub use error::{ClientError, Result};
pub use guard::{AuthGuard, GuardDecision};
pub use poll::Poller;
pub use products::ProductService;
pub use search::{SearchHandle, SearchPipeline};
pub use session::{AuthStatus, AuthStatusFixed, SessionManager};
pub use state::AuthState;
pub use token_store::{FileStore, KeyValueStore, MemoryStore, TokenStore};
pub use types::{AuthResponse, Credentials, Product, SignupRequest, UserId, UserPayload};
