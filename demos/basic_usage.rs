//! Basic usage example
//!
//! Usage:
//!   cargo run --example basic_usage

use std::sync::Arc;

use taskflow_client::types::LoginRequest;
use taskflow_client::{
    ApiClient, AuthService, ClientConfig, FileTokenStore, NotificationService, ProjectService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Configuration
    let base_url =
        std::env::var("TASKFLOW_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let email = std::env::var("TASKFLOW_EMAIL").unwrap_or_else(|_| "dev@example.com".to_string());
    let password = std::env::var("TASKFLOW_PASSWORD").unwrap_or_else(|_| "hunter2".to_string());

    println!("=== TaskFlow Rust Client Example ===");
    println!("API: {}", base_url);
    println!();

    // Durable token storage; credentials survive restarts
    let store = Arc::new(FileTokenStore::open("taskflow-tokens.json")?);
    let client = ApiClient::new(ClientConfig::new(base_url), store)?;

    // The session boundary decides what expiry means for the app
    client.set_session_expired_hook(Arc::new(|| {
        println!("! Session expired — please sign in again");
    }));

    let auth = AuthService::new(client.clone());
    let tokens = auth
        .login(&LoginRequest {
            email,
            password,
            remember_me: Some(true),
        })
        .await?;
    if let Some(user) = &tokens.user {
        println!("✓ Signed in as {}", user.display_name);
    }

    // Token refresh is transparent from here on: any 401 triggers a
    // refresh and a single retry before the caller sees an error.
    let projects = ProjectService::new(client.clone());
    let page = projects.list().await?;
    println!("✓ {} project(s):", page.pagination.total);
    for project in &page.data {
        println!("  - {} ({})", project.name, project.id);
    }
    println!();

    let notifications = NotificationService::new(client.clone());
    let unread = notifications.unread_count().await?;
    println!("✓ {unread} unread notification(s)");

    auth.logout().await?;
    println!("✓ Signed out");

    Ok(())
}
