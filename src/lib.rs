//! TaskFlow Rust Client
//!
//! A Rust client library for the TaskFlow task/project management API,
//! with automatic bearer authentication, durable token storage, and
//! transparent refresh-and-retry on credential expiry.

pub mod api_client;
pub mod auth;
pub mod constants;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod token_store;
pub mod types;

pub use api_client::{
    ApiClient, ClientConfig, ProgressFn, RequestDescriptor, SessionExpiredHook, UploadPayload,
};
pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use error::{ClientError, Result};
pub use notifications::NotificationService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
