// ABOUTME: Typed client for the authentication service
// ABOUTME: Register, login, refresh and password reset; login populates the token store

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ErrorContext, Result, SessionError};
use crate::models::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, Profile, RefreshResponse,
    RegisterRequest, ResetPasswordRequest, Session,
};
use crate::store::TokenStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Exchanges a refresh token for a new access token.
///
/// The session interceptor depends on this seam rather than on
/// [`AuthClient`] so its state machine can be driven without a network.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse>;
}

/// Client for the auth service. Each operation is one request/response pair
/// with no retry of its own.
#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self { transport, store }
    }

    /// Create an account. Returns the service's confirmation message.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<String> {
        let request = ApiRequest::post("/auth/register").json(&RegisterRequest {
            username,
            email,
            password,
        })?;

        let resp = self.call(&request, ErrorContext::Account).await?;
        tracing::info!(username, "account registered");
        Ok(resp.text())
    }

    /// Log in and persist the resulting session.
    ///
    /// Tokens and profile are written together; the profile is then written
    /// again on its own key so it can be read without the tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let request =
            ApiRequest::post("/auth/login").json(&LoginRequest { username, password })?;

        let resp = self.call(&request, ErrorContext::Credentials).await?;
        let login: LoginResponse = resp.json()?;
        let session = login.into_session();

        self.store.set(&session)?;
        self.store.set_profile(&session.profile)?;

        tracing::info!(username = %session.profile.username, "logged in");
        Ok(session)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Does not touch the token store; the caller decides how to merge.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let request = ApiRequest::post("/auth/refresh-token").raw(refresh_token);
        let resp = self.call(&request, ErrorContext::Credentials).await?;
        resp.json()
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let request =
            ApiRequest::post("/auth/forgot-password").json(&ForgotPasswordRequest { email })?;
        let resp = self.call(&request, ErrorContext::Account).await?;
        Ok(resp.text())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        let request = ApiRequest::post("/auth/reset-password").json(&ResetPasswordRequest {
            token,
            new_password,
        })?;
        let resp = self.call(&request, ErrorContext::Account).await?;
        Ok(resp.text())
    }

    /// Local-only: forget the session. There is no server-side session to end.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// The cached profile of the last login, if any.
    pub fn current_profile(&self) -> Option<Profile> {
        self.store.profile()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.access_token().is_some()
    }

    async fn call(&self, request: &ApiRequest, context: ErrorContext) -> Result<ApiResponse> {
        tracing::debug!(method = %request.method, path = %request.path, "auth request");

        let resp = self.transport.send(request).await?;
        if resp.is_success() {
            return Ok(resp);
        }

        let err = SessionError::from_status(resp.status, &resp.body, context);
        tracing::debug!(path = %request.path, status = resp.status, error = %err, "auth request rejected");
        Err(err)
    }
}

#[async_trait]
impl TokenRefresher for AuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        AuthClient::refresh(self, refresh_token).await
    }
}
