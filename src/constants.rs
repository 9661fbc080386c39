//! Client-wide constants: storage keys, timeouts, pagination and upload limits

use std::time::Duration;

/// Storage key for the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "taskflow_auth_token";

/// Storage key for the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "taskflow_refresh_token";

/// Per-request timeout applied to every dispatch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Maximum attachment size accepted by the upload endpoints (10 MiB).
pub const UPLOAD_MAX_SIZE: usize = 10 * 1024 * 1024;

/// MIME types the backend accepts for attachments.
pub const UPLOAD_ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
];
