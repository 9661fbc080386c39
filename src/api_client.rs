//! Authenticated API gateway with transparent token refresh
//!
//! Every request goes through the same pipeline: attach the stored
//! bearer token, dispatch, and on a 401 refresh the credential pair and
//! retry the original request exactly once. Refresh failure (or a
//! missing refresh token) clears the stored credentials and surfaces
//! [`ClientError::SessionExpired`]; navigation and state teardown are
//! left to whoever registered the session-expiry hook.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_singleflight::Group;
use futures_util::stream;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::REQUEST_TIMEOUT;
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::token_store::TokenStore;
use crate::types::{ApiResponse, AuthTokens, ErrorEnvelope, RefreshRequest};

/// Singleflight key: there is only ever one logical refresh operation.
const REFRESH_FLIGHT_KEY: &str = "token-refresh";

/// Chunk size for streamed multipart bodies; each chunk advances the
/// progress callback.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Called when stored credentials are cleared after an irrecoverable
/// authentication failure. A session-boundary layer typically navigates
/// to its login entry point from here.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Progress callback for uploads; receives whole percentages 0..=100.
pub type ProgressFn = Arc<dyn Fn(u32) + Send + Sync>;

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the TaskFlow API (e.g. `https://api.taskflow.example`).
    pub base_url: String,

    /// Per-request timeout. Default: 30 seconds.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

enum Payload {
    None,
    Json(serde_json::Value),
    Multipart(UploadPayload),
}

/// One HTTP request: method, path, query and body. Immutable per
/// attempt; the refresh retry re-sends the same descriptor with a new
/// Authorization header.
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Payload,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    /// Attach a JSON body. Serialized once so the retry replays the
    /// identical payload.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.payload = Payload::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, upload: UploadPayload) -> Self {
        self.payload = Payload::Multipart(upload);
        self
    }

    fn is_refresh(&self) -> bool {
        self.path == endpoints::auth::REFRESH
    }
}

/// Multipart file payload for the upload endpoints.
///
/// Bytes are kept in memory so the form can be rebuilt if the request is
/// retried after a token refresh.
pub struct UploadPayload {
    field_name: String,
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
    progress: Option<ProgressFn>,
}

impl UploadPayload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field_name: "file".to_string(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
            progress: None,
        }
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Register a progress callback; it receives
    /// `floor(bytes_sent * 100 / bytes_total)` as chunks are handed to
    /// the transport.
    pub fn on_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn to_form(&self) -> Result<Form> {
        let total = self.bytes.len() as u64;
        let part = match &self.progress {
            Some(progress) if total > 0 => {
                let counted = count_chunks(&self.bytes, total, Arc::clone(progress));
                Part::stream_with_length(Body::wrap_stream(stream::iter(counted)), total)
            }
            _ => Part::bytes(self.bytes.clone()),
        };
        let part = part
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)?;
        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

/// Split `bytes` into transport chunks, reporting cumulative progress as
/// each chunk is yielded.
fn count_chunks(
    bytes: &[u8],
    total: u64,
    progress: ProgressFn,
) -> impl Iterator<Item = std::result::Result<Vec<u8>, std::io::Error>> {
    let chunks: Vec<Vec<u8>> = bytes
        .chunks(UPLOAD_CHUNK_SIZE)
        .map(|c| c.to_vec())
        .collect();
    let mut sent: u64 = 0;
    chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        progress((sent * 100 / total) as u32);
        Ok(chunk)
    })
}

/// API client with automatic bearer authentication
///
/// Constructed once per process and shared via `Arc`; the token store is
/// injected so embedders and tests control credential persistence.
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    /// Singleflight group coalescing concurrent token refreshes: the
    /// first 401 performs the network call, concurrent 401s share its
    /// outcome. Error type is String because singleflight requires a
    /// shared error type.
    refresh_flight: Group<String, String>,
    on_session_expired: OnceLock<SessionExpiredHook>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `config` - Base URL and timeout
    /// * `store` - Durable storage for the credential pair
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Arc<Self>> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration(
                "base_url must not be empty".to_string(),
            ));
        }

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Arc::new(Self {
            http,
            base_url,
            store,
            refresh_flight: Group::new(),
            on_session_expired: OnceLock::new(),
        }))
    }

    /// Register the session-boundary hook fired when credentials are
    /// cleared. Only the first registration takes effect.
    pub fn set_session_expired_hook(&self, hook: SessionExpiredHook) {
        let _ = self.on_session_expired.set(hook);
    }

    /// The injected token store (for session bootstrap and logout).
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Typed convenience wrappers ─────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T> {
        self.execute(RequestDescriptor::get(path)).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        self.execute(RequestDescriptor::get(path).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<T> {
        self.execute(RequestDescriptor::post(path).json(body)?).await
    }

    /// POST without a body (archive/unarchive style routes).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T> {
        self.execute(RequestDescriptor::post(path)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<T> {
        self.execute(RequestDescriptor::put(path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<T> {
        self.execute(RequestDescriptor::patch(path).json(body)?).await
    }

    pub async fn delete_unit(&self, path: impl Into<String>) -> Result<()> {
        self.execute_unit(RequestDescriptor::delete(path)).await
    }

    /// File upload through the identical auth/retry pipeline.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        payload: UploadPayload,
    ) -> Result<T> {
        self.execute(RequestDescriptor::post(path).multipart(payload))
            .await
    }

    // ─── Pipeline ───────────────────────────────────────────────────

    /// Run a descriptor through the pipeline and deserialize the body.
    pub async fn execute<T: DeserializeOwned>(&self, desc: RequestDescriptor) -> Result<T> {
        let resp = self.dispatch(&desc).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Run a descriptor and discard the response body (204-style routes).
    pub async fn execute_unit(&self, desc: RequestDescriptor) -> Result<()> {
        self.dispatch(&desc).await?;
        Ok(())
    }

    async fn dispatch(&self, desc: &RequestDescriptor) -> Result<Response> {
        let bearer = self.store.access_token()?;
        let resp = self.send(desc, bearer.as_deref()).await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return self.into_success(resp).await;
        }

        // A rejected refresh call must not trigger another refresh.
        if desc.is_refresh() {
            warn!("refresh endpoint rejected the refresh token");
            self.expire_session();
            return Err(ClientError::SessionExpired);
        }

        debug!(path = %desc.path, "received 401, refreshing access token");
        let token = self.refresh_access_token().await?;

        // Exactly one retry; a second 401 surfaces like any other error.
        let retry = self.send(desc, Some(&token)).await?;
        self.into_success(retry).await
    }

    async fn send(&self, desc: &RequestDescriptor, bearer: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, desc.path);
        let mut req = self.http.request(desc.method.clone(), &url);
        if !desc.query.is_empty() {
            req = req.query(&desc.query);
        }
        req = match &desc.payload {
            Payload::None => req,
            Payload::Json(value) => req.json(value),
            Payload::Multipart(upload) => req.multipart(upload.to_form()?),
        };
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    /// Map a settled response to success or a typed error. Non-2xx
    /// responses with a structured `{error:{...}}` body become
    /// [`ClientError::Api`]; anything else propagates as transport.
    async fn into_success(&self, resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let transport = resp.error_for_status_ref().err();
        let raw = resp.text().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&raw) {
            return Err(ClientError::Api {
                code: envelope.error.code,
                message: envelope.error.message,
                details: envelope.error.details,
            });
        }
        match transport {
            Some(e) => Err(ClientError::Transport(e)),
            None => Err(ClientError::InvalidResponse(format!(
                "unexpected response: {raw}"
            ))),
        }
    }

    /// Refresh the access token, coalescing concurrent callers so only
    /// one network refresh is in flight at a time.
    async fn refresh_access_token(&self) -> Result<String> {
        let (token, err, _shared) = self
            .refresh_flight
            .work(REFRESH_FLIGHT_KEY, async {
                self.do_refresh().await.map_err(|e| e.to_string())
            })
            .await;

        match (token, err) {
            (Some(token), None) => Ok(token),
            // The owner already cleared the session; waiters just
            // observe the shared failure.
            _ => Err(ClientError::SessionExpired),
        }
    }

    async fn do_refresh(&self) -> Result<String> {
        let refresh_token = match self.store.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("401 received with no stored refresh token");
                self.expire_session();
                return Err(ClientError::SessionExpired);
            }
            Err(e) => {
                self.expire_session();
                return Err(e);
            }
        };

        let url = format!("{}{}", self.base_url, endpoints::auth::REFRESH);
        let result = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await;

        let resp = match result {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(status = %resp.status(), "token refresh rejected");
                self.expire_session();
                return Err(ClientError::SessionExpired);
            }
            Err(e) => {
                warn!(error = %e, "token refresh request failed");
                self.expire_session();
                return Err(ClientError::SessionExpired);
            }
        };

        let body: ApiResponse<AuthTokens> = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "malformed refresh response");
                self.expire_session();
                return Err(ClientError::SessionExpired);
            }
        };

        self.store
            .store_credentials(&body.data.access_token, body.data.refresh_token.as_deref())?;
        info!("access token refreshed");

        Ok(body.data.access_token)
    }

    /// Clear stored credentials and notify the session boundary.
    pub(crate) fn expire_session(&self) {
        if let Err(e) = self.store.clear_credentials() {
            warn!(error = %e, "failed to clear stored credentials");
        }
        if let Some(hook) = self.on_session_expired.get() {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = Arc::new(MemoryTokenStore::new());
        let client =
            ApiClient::new(ClientConfig::new("http://localhost:8080/"), store).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let store = Arc::new(MemoryTokenStore::new());
        let result = ApiClient::new(ClientConfig::new(""), store);
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_session_expired_hook_fires_on_clear() {
        let store = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::new(ClientConfig::new("http://localhost"), store).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        client.set_session_expired_hook(Arc::new(move || {
            flag.store(true, Ordering::SeqCst);
        }));

        client.expire_session();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_refresh_descriptor_detected() {
        let desc = RequestDescriptor::post(crate::endpoints::auth::REFRESH);
        assert!(desc.is_refresh());
        let desc = RequestDescriptor::post(crate::endpoints::auth::LOGIN);
        assert!(!desc.is_refresh());
    }

    #[test]
    fn test_chunk_progress_monotonic_and_complete() {
        let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let bytes = vec![0u8; 200 * 1024];
        let total = bytes.len() as u64;

        let chunks: Vec<_> =
            count_chunks(&bytes, total, Arc::new(move |pct| sink.lock().unwrap().push(pct)))
                .collect();

        assert_eq!(chunks.len(), 4); // 200 KiB in 64 KiB chunks
        let seen = seen.lock().unwrap();
        assert_eq!(*seen.last().unwrap(), 100);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        // floor semantics: 64/200, 128/200, 192/200, 200/200
        assert_eq!(*seen, vec![32, 64, 96, 100]);
    }

    #[test]
    fn test_upload_payload_accessors() {
        let payload = UploadPayload::new("a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(payload.size(), 3);
        assert_eq!(payload.mime_type(), "image/png");
    }
}
