// ABOUTME: Data types shared by the auth client, token store and notes client
// ABOUTME: Wire formats use the services' camelCase JSON field names

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Cached account profile, persisted separately from the tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

/// The logged-in account: both tokens plus the cached profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub profile: Profile,
}

impl Session {
    /// Copy of this session carrying a refreshed access token.
    ///
    /// The refresh token is replaced only when the auth service issued a new one.
    pub fn refreshed(&self, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token: refresh_token.unwrap_or_else(|| self.refresh_token.clone()),
            profile: self.profile.clone(),
        }
    }
}

/// Body of `POST /auth/login` and `POST /auth/refresh-token` responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "type", default = "default_token_type")]
    pub token_type: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl LoginResponse {
    pub fn profile(&self) -> Profile {
        Profile {
            username: self.username.clone(),
            email: self.email.clone(),
            roles: self.roles.iter().cloned().collect(),
        }
    }

    pub fn into_session(self) -> Session {
        let profile = self.profile();
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            profile,
        }
    }
}

/// Tokens returned by a refresh; only the access token is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

/// A note as returned by the notes service. Only the service assigns
/// `id`, `user_id` and the timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub user_id: i64,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Note {
    /// Last modification time, falling back to creation time.
    pub fn last_modified(&self) -> Option<NaiveDateTime> {
        self.updated_at.or(self.created_at)
    }
}

/// The client-editable part of a note, used for both create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> Self {
        Self::new(note.title.clone(), note.description.clone())
    }
}

/// The notes service may send `null` for an unset description.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde helpers for the notes service timestamps.
///
/// The service formats dates as `yyyy-MM-dd HH:mm`; ISO local date-times and
/// RFC 3339 are accepted too. Unparseable values become `None`.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const SERVICE_FORMAT: &str = "%Y-%m-%d %H:%M";
    const FORMATS: &[&str] = &[
        SERVICE_FORMAT,
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(SERVICE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_note_from_service_json() {
        let json = r#"{
            "id": 7,
            "title": "Groceries",
            "description": "milk, eggs",
            "userId": 3,
            "createdAt": "2024-03-01 09:15",
            "updatedAt": null
        }"#;

        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, 7);
        assert_eq!(note.user_id, 3);
        assert_eq!(
            note.created_at,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 15, 0)
        );
        assert!(note.updated_at.is_none());
        assert_eq!(note.last_modified(), note.created_at);
    }

    #[test]
    fn test_null_description_is_empty() {
        let json = r#"[
            {"id":1,"title":"t","description":null,"userId":3,"createdAt":"2024-03-01 09:15"},
            {"id":2,"title":"u","userId":3}
        ]"#;

        let notes: Vec<Note> = serde_json::from_str(json).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].description, "");
        assert_eq!(notes[1].description, "");
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(timestamp::parse("2024-03-01T09:15:30.123456").is_some());
        assert!(timestamp::parse("2024-03-01T09:15:30Z").is_some());
        assert!(timestamp::parse("2024-03-01 09:15:30").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_login_response_defaults() {
        let json = r#"{
            "accessToken": "a",
            "refreshToken": "r",
            "username": "ada",
            "email": "ada@example.com",
            "roles": ["USER", "USER"]
        }"#;

        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token_type, "Bearer");

        let session = resp.into_session();
        assert_eq!(session.access_token, "a");
        assert_eq!(session.profile.roles.len(), 1);
        assert!(session.profile.roles.contains("USER"));
    }

    #[test]
    fn test_refreshed_keeps_refresh_token_unless_reissued() {
        let session = Session {
            access_token: "old".into(),
            refresh_token: "r1".into(),
            profile: Profile::default(),
        };

        let kept = session.refreshed("new".into(), None);
        assert_eq!(kept.access_token, "new");
        assert_eq!(kept.refresh_token, "r1");

        let rotated = session.refreshed("new".into(), Some("r2".into()));
        assert_eq!(rotated.refresh_token, "r2");
    }

    #[test]
    fn test_draft_wire_shape() {
        let draft = NoteDraft::new("t", "d");
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, serde_json::json!({ "title": "t", "description": "d" }));
    }
}
