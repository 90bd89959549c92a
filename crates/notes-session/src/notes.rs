// ABOUTME: Typed CRUD and search operations against the notes service
// ABOUTME: Every call goes through the session interceptor; callers never see tokens

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::Result;
use crate::interceptor::SessionInterceptor;
use crate::models::{Note, NoteDraft};
use crate::transport::ApiRequest;

/// Characters `encodeURIComponent` leaves alone.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone)]
pub struct NotesClient {
    interceptor: Arc<SessionInterceptor>,
}

impl NotesClient {
    pub fn new(interceptor: Arc<SessionInterceptor>) -> Self {
        Self { interceptor }
    }

    /// All notes of the logged-in account, in the service's order.
    pub async fn list(&self) -> Result<Vec<Note>> {
        let notes: Vec<Note> = self.interceptor.execute_json(ApiRequest::get("/notes")).await?;
        tracing::debug!(count = notes.len(), "listed notes");
        Ok(notes)
    }

    pub async fn get(&self, id: i64) -> Result<Note> {
        self.interceptor
            .execute_json(ApiRequest::get(format!("/notes/{id}")))
            .await
    }

    pub async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        let note: Note = self
            .interceptor
            .execute_json(ApiRequest::post("/notes").json(draft)?)
            .await?;
        tracing::info!(id = note.id, "note created");
        Ok(note)
    }

    /// Replace title and description of an existing note.
    pub async fn update(&self, id: i64, draft: &NoteDraft) -> Result<Note> {
        self.interceptor
            .execute_json(ApiRequest::put(format!("/notes/{id}")).json(draft)?)
            .await
    }

    /// Delete a note. A missing id is reported as `NotFound`, not as success.
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.interceptor
            .execute(ApiRequest::delete(format!("/notes/{id}")))
            .await?;
        tracing::info!(id, "note deleted");
        Ok(())
    }

    /// Server-side match over title and description.
    ///
    /// A blank query is not sent to the search endpoint; it lists instead.
    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        self.interceptor
            .execute_json(ApiRequest::get(search_path(query)))
            .await
    }
}

fn search_path(query: &str) -> String {
    format!(
        "/notes/search?query={}",
        utf8_percent_encode(query, QUERY_COMPONENT)
    )
}
