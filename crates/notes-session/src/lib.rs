// ABOUTME: Client-side session layer for the notes auth and resource services
// ABOUTME: Token store, auth client, refresh-and-replay interceptor, typed notes client

pub mod auth;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod models;
pub mod navigator;
pub mod notes;
pub mod store;
pub mod transport;

use std::sync::Arc;

pub use auth::{AuthClient, TokenRefresher};
pub use config::SessionConfig;
pub use error::{ErrorContext, Result, SessionError};
pub use interceptor::SessionInterceptor;
pub use models::{LoginResponse, Note, NoteDraft, Profile, RefreshResponse, Session};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
pub use notes::NotesClient;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Everything a caller needs, wired around one shared token store.
///
/// The auth client and the notes interceptor see the same store, so a login
/// is immediately visible to resource calls and a failed refresh logs out
/// both.
#[derive(Clone)]
pub struct SessionContext {
    pub auth: AuthClient,
    pub notes: NotesClient,
    store: Arc<dyn TokenStore>,
}

impl SessionContext {
    /// Build HTTP clients for both services from `config`.
    pub fn new(
        config: &SessionConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let auth_transport = HttpTransport::new(
            config.auth_url.clone(),
            config.timeout,
            config.connect_timeout,
        )?;
        let notes_transport = HttpTransport::new(
            config.notes_url.clone(),
            config.timeout,
            config.connect_timeout,
        )?;

        tracing::debug!(
            auth_url = %config.auth_url,
            notes_url = %config.notes_url,
            "session context created"
        );

        Ok(Self::with_transports(
            Arc::new(auth_transport),
            Arc::new(notes_transport),
            store,
            navigator,
        ))
    }

    /// Wire the clients over arbitrary transports.
    pub fn with_transports(
        auth_transport: Arc<dyn Transport>,
        notes_transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth = AuthClient::new(auth_transport, store.clone());
        let interceptor = SessionInterceptor::new(
            notes_transport,
            Arc::new(auth.clone()),
            store.clone(),
            navigator,
        );

        Self {
            auth,
            notes: NotesClient::new(Arc::new(interceptor)),
            store,
        }
    }

    /// Open the store named by `config`: a file store when a path is set,
    /// otherwise an in-memory one.
    pub fn open_store(config: &SessionConfig) -> Arc<dyn TokenStore> {
        match &config.store_path {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(MemoryTokenStore::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }
}
