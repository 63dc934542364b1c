//! Storefront client walkthrough
//!
//! Usage:
//!   STOREFRONT_API_URL=http://localhost:3000 cargo run --example storefront

use std::sync::Arc;
use std::time::Duration;
use storefront_client::{
    AuthGuard, ClientConfig, Credentials, FileStore, ProductService, SessionManager, TokenStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env()?;

    let email = std::env::var("STOREFRONT_EMAIL").unwrap_or_else(|_| "admin@shop.test".to_string());
    let password = std::env::var("STOREFRONT_PASSWORD").unwrap_or_else(|_| "secret".to_string());
    let session_file = std::env::var("STOREFRONT_SESSION_FILE")
        .unwrap_or_else(|_| "storefront-session.json".to_string());

    println!("=== Storefront Client Example ===");
    println!("API: {}", config.api_url);
    println!("Session file: {}", session_file);
    println!();

    // Tokens persist across runs in the session file
    let store = TokenStore::new(Arc::new(FileStore::open(&session_file)?));
    let session = SessionManager::new(config.clone(), store)?;
    let guard = AuthGuard::new(session.clone());

    println!("Signed in from previous run: {}", session.is_authenticated());
    println!("Guard on /dashboard/profile: {:?}", guard.can_activate("/dashboard/profile"));
    println!();

    if !session.is_authenticated() {
        println!("Logging in as {}...", email);
        match session.login(&Credentials { email, password }).await {
            Ok(_) => println!("✓ Logged in"),
            Err(e) => println!("! Login failed: {}", e.user_message("An error occurred while signing in.")),
        }
        println!();
    }

    if let Some(user) = session.current_user() {
        println!("User: {} (id {}), token expires at {}", user.name, user.id, user.exp);
    }
    println!("Google sign-in entry point: {}", session.google_login_url());
    println!();

    let products = ProductService::new(config)?;
    let catalog = products.get_products().await?;
    println!("Catalog ({} products):", catalog.len());
    for product in &catalog {
        println!("  - #{} {} ({:.2})", product.id, product.name, product.price);
    }
    println!();

    let pipeline = products.search_pipeline(catalog);
    let mut results = pipeline.subscribe();
    let term = std::env::var("STOREFRONT_SEARCH").unwrap_or_else(|_| "Jeans".to_string());
    pipeline.submit(term.clone());
    if tokio::time::timeout(Duration::from_secs(2), results.changed()).await.is_ok() {
        println!("Search '{}': {} match(es)", term, results.borrow().len());
    }
    println!();

    println!("Polling the catalog for 3 seconds...");
    let poller = products.poll_products()?;
    let mut latest = poller.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(3));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = latest.changed() => {
                if changed.is_err() {
                    break;
                }
                let count = latest.borrow_and_update().as_ref().map(Vec::len).unwrap_or(0);
                println!("  poll: {} products", count);
            }
        }
    }
    poller.stop();
    println!();

    if std::env::var("STOREFRONT_LOGOUT").is_ok() {
        session.logout();
        println!("✓ Logged out");
        // Give the backend notification a moment to go out
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    println!("Done!");
    Ok(())
}
