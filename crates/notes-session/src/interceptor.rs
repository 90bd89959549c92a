// ABOUTME: Session interceptor wrapped around the notes service transport
// ABOUTME: Attaches the bearer token, refreshes once on 401 and replays the call once

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;

use crate::auth::TokenRefresher;
use crate::error::{ErrorContext, Result, SessionError};
use crate::navigator::Navigator;
use crate::store::TokenStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Outcome of one refresh cycle: the access token now in the store.
type RefreshOutcome = std::result::Result<String, SessionError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Makes every notes call authorized and recovers from an expired access
/// token without the caller seeing it.
///
/// Per call: attach the stored access token and send. A 401 on the first
/// send triggers one refresh; the call is then replayed exactly once with
/// the new token and the replay's result is final. If the refresh cannot
/// happen or fails, the store is cleared, the navigator is told to go to
/// login, and the caller gets the original authorization error.
///
/// Concurrent calls that hit a 401 while a refresh is running wait on that
/// same refresh instead of starting their own.
pub struct SessionInterceptor {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn TokenRefresher>,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl SessionInterceptor {
    pub fn new(
        transport: Arc<dyn Transport>,
        refresher: Arc<dyn TokenRefresher>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            refresher,
            store,
            navigator,
            in_flight: Mutex::new(None),
        }
    }

    /// Send a call through the refresh-and-replay cycle and return the
    /// successful response, or the error that ended it.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        // Read per call, never cached across calls
        let sent_with = self.store.access_token();

        let resp = self
            .send(request.clone().with_bearer(sent_with.clone()), false)
            .await?;

        if resp.is_success() {
            return Ok(resp);
        }
        if !resp.is_unauthorized() {
            return Err(reject(&resp));
        }

        let auth_error = reject(&resp);
        tracing::warn!(
            method = %request.method,
            path = %request.path,
            "access token rejected, refreshing"
        );

        let token = match self.renew(sent_with.as_deref()).await {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(error = %e, "refresh failed, surfacing original error");
                return Err(auth_error);
            }
        };

        // The replay's result is final, a second 401 included.
        let replay = self.send(request.with_bearer(Some(token)), true).await?;
        if replay.is_success() {
            Ok(replay)
        } else {
            Err(reject(&replay))
        }
    }

    /// `execute` and decode the JSON body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    async fn send(&self, request: ApiRequest, replay: bool) -> Result<ApiResponse> {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            replay,
            authorized = request.bearer.is_some(),
            "notes request"
        );
        self.transport.send(&request).await
    }

    /// A usable access token after a 401, refreshing if nobody else has.
    async fn renew(&self, sent_with: Option<&str>) -> RefreshOutcome {
        if let Some(current) = self.store.access_token() {
            if sent_with != Some(current.as_str()) {
                tracing::debug!("token already replaced by another call");
                return Ok(current);
            }
        }

        let refresh = {
            let mut slot = lock(&self.in_flight);
            match slot.as_ref() {
                Some(pending) if pending.peek().is_none() => pending.clone(),
                _ => {
                    let started = self.start_refresh();
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let outcome = refresh.await;

        let mut slot = lock(&self.in_flight);
        if slot.as_ref().is_some_and(|f| f.peek().is_some()) {
            *slot = None;
        }

        outcome
    }

    fn start_refresh(&self) -> SharedRefresh {
        let refresher = Arc::clone(&self.refresher);
        let store = Arc::clone(&self.store);
        let navigator = Arc::clone(&self.navigator);

        async move {
            let Some(session) = store.get() else {
                tracing::warn!("no refresh token stored");
                teardown(store.as_ref(), navigator.as_ref());
                return Err(SessionError::Auth("no refresh token available".to_string()));
            };

            let refreshed = match refresher.refresh(&session.refresh_token).await {
                Ok(refreshed) => refreshed,
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh failed");
                    teardown(store.as_ref(), navigator.as_ref());
                    return Err(e);
                }
            };

            let next = session.refreshed(refreshed.access_token, refreshed.refresh_token);
            if let Err(e) = store.set(&next) {
                tracing::warn!(error = %e, "failed to store refreshed session");
                teardown(store.as_ref(), navigator.as_ref());
                return Err(e);
            }

            tracing::info!("access token refreshed");
            Ok(next.access_token)
        }
        .boxed()
        .shared()
    }
}

/// Clear the session and send the user to login.
fn teardown(store: &dyn TokenStore, navigator: &dyn Navigator) {
    if let Err(e) = store.clear() {
        tracing::warn!(error = %e, "failed to clear token store");
    }
    navigator.redirect_to_login();
}

fn reject(resp: &ApiResponse) -> SessionError {
    SessionError::from_status(resp.status, &resp.body, ErrorContext::Resource)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
