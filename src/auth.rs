//! Authentication operations: login, registration, session lifecycle
//!
//! Successful login/registration/refresh persist the returned credential
//! pair into the client's token store; logout always clears it, even if
//! the server-side call fails.

use std::sync::Arc;

use tracing::debug;

use crate::api_client::{ApiClient, RequestDescriptor};
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::User;
use crate::token_store::TokenStore;
use crate::types::{
    ApiResponse, AuthTokens, LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
};

pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Authenticate with email and password; persists the returned
    /// credential pair.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthTokens> {
        let tokens: AuthTokens = self
            .client
            .post(endpoints::auth::LOGIN, credentials)
            .await?;
        self.persist(&tokens)?;
        Ok(tokens)
    }

    /// Create an account; the backend signs the new user in directly.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthTokens> {
        let tokens: AuthTokens = self
            .client
            .post(endpoints::auth::REGISTER, registration)
            .await?;
        self.persist(&tokens)?;
        Ok(tokens)
    }

    /// End the session. The server call is best effort; local
    /// credentials are cleared regardless of its outcome.
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self
            .client
            .execute_unit(RequestDescriptor::post(endpoints::auth::LOGOUT))
            .await
        {
            debug!(error = %e, "server-side logout failed, clearing local credentials anyway");
        }
        self.client.token_store().clear_credentials()?;
        Ok(())
    }

    /// Currently authenticated user.
    pub async fn me(&self) -> Result<User> {
        let resp: ApiResponse<User> = self.client.get(endpoints::auth::ME).await?;
        Ok(resp.data)
    }

    /// Explicit token refresh. The gateway already refreshes
    /// transparently on 401; this is for proactive rotation.
    pub async fn refresh(&self) -> Result<AuthTokens> {
        let refresh_token = match self.client.token_store().refresh_token()? {
            Some(token) => token,
            None => {
                self.client.expire_session();
                return Err(ClientError::SessionExpired);
            }
        };

        let resp: ApiResponse<AuthTokens> = self
            .client
            .post(endpoints::auth::REFRESH, &RefreshRequest { refresh_token })
            .await?;
        self.persist(&resp.data)?;
        Ok(resp.data)
    }

    pub async fn verify_email(&self, token: &str) -> Result<()> {
        let body = serde_json::json!({ "token": token });
        self.client
            .execute_unit(RequestDescriptor::post(endpoints::auth::VERIFY_EMAIL).json(&body)?)
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let body = serde_json::json!({ "email": email });
        self.client
            .execute_unit(RequestDescriptor::post(endpoints::auth::FORGOT_PASSWORD).json(&body)?)
            .await
    }

    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<()> {
        self.client
            .execute_unit(RequestDescriptor::post(endpoints::auth::RESET_PASSWORD).json(request)?)
            .await
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let body = serde_json::json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        self.client
            .execute_unit(RequestDescriptor::post(endpoints::users::CHANGE_PASSWORD).json(&body)?)
            .await
    }

    fn persist(&self, tokens: &AuthTokens) -> Result<()> {
        self.client
            .token_store()
            .store_credentials(&tokens.access_token, tokens.refresh_token.as_deref())
    }
}
