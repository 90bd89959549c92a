// ABOUTME: Shared fixtures for notes-session integration tests
// ABOUTME: Starts mock auth and notes services and wires a SessionContext against them

use std::sync::Arc;
use std::time::Duration;

use notes_session::{
    MemoryTokenStore, Profile, RecordingNavigator, Session, SessionConfig, SessionContext,
    TokenStore,
};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Mock auth and notes services, each mounted under `/api` like the real ones.
pub struct Services {
    pub auth: MockServer,
    pub notes: MockServer,
}

impl Services {
    pub async fn start() -> Self {
        Self {
            auth: MockServer::start().await,
            notes: MockServer::start().await,
        }
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(
            &format!("{}/api", self.auth.uri()),
            &format!("{}/api", self.notes.uri()),
        )
        .expect("mock urls should parse")
        .with_store_path(None)
        .with_timeout(Duration::from_secs(5))
    }

    /// Context over `store` with a navigator that counts redirects.
    pub fn context(&self, store: Arc<dyn TokenStore>) -> (SessionContext, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let ctx = SessionContext::new(&self.config(), store, navigator.clone())
            .expect("should build session context");
        (ctx, navigator)
    }
}

#[allow(dead_code)]
pub fn logged_in_store(access: &str, refresh: &str) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_session(&Session {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        profile: Profile {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            roles: ["USER".to_string()].into_iter().collect(),
        },
    }))
}

#[allow(dead_code)]
pub fn login_body(access: &str, refresh: &str) -> Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "type": "Bearer",
        "username": "ada",
        "email": "ada@example.com",
        "roles": ["USER"]
    })
}

#[allow(dead_code)]
pub fn note(id: i64, title: &str, description: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": description,
        "userId": 1,
        "createdAt": "2024-03-01 09:30",
        "updatedAt": null
    })
}
