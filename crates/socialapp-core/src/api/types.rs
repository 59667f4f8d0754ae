//! Typed request and response records for the social backend.
//!
//! The backend owns these schemas. Fields this client reads are modeled
//! explicitly; anything else the backend sends is kept in `extra` so records
//! survive schema additions without data loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated user's profile as returned under `credentials` by `GET /user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Fields not modeled by this client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A like recorded by the current user on a scream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    /// `None` when the like was recorded before credentials were loaded.
    #[serde(default)]
    pub user_handle: Option<String>,
    pub scream_id: String,
}

/// A notification addressed to the current user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scream_id: Option<String>,
    /// `like` or `comment` on the backend this was written against.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub handle: String,
}

/// Successful `POST /login` / `POST /signup` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `POST /user`. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl UserDetails {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none() && self.website.is_none() && self.location.is_none()
    }
}

/// Image file for `POST /user/image`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Guesses the MIME type from the file extension.
    ///
    /// The backend accepts only JPEG and PNG; other extensions are sent as
    /// `application/octet-stream` and left for the backend to reject.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let mime_type = match ext.as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            _ => "application/octet-stream",
        };
        Self {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_data_keeps_unknown_fields() {
        let body = json!({
            "credentials": {"handle": "alice", "followers": 3},
            "likes": [{"userHandle": "alice", "screamId": "s1"}],
            "notifications": [{"id": 1, "read": false}]
        });

        let data: UserData = serde_json::from_value(body).unwrap();
        assert_eq!(data.credentials.handle.as_deref(), Some("alice"));
        assert_eq!(data.credentials.extra.get("followers"), Some(&json!(3)));
        assert_eq!(data.likes[0].scream_id, "s1");
        assert_eq!(data.notifications[0].extra.get("id"), Some(&json!(1)));
        assert!(!data.notifications[0].read);
    }

    #[test]
    fn test_user_data_missing_lists_default_to_empty() {
        let data: UserData =
            serde_json::from_value(json!({"credentials": {"handle": "bob"}})).unwrap();
        assert!(data.likes.is_empty());
        assert!(data.notifications.is_empty());
    }

    #[test]
    fn test_like_without_screamid_is_rejected() {
        let result = serde_json::from_value::<Like>(json!({"userHandle": "alice"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_details_omits_unset_fields() {
        let details = UserDetails {
            bio: Some("hi".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&details).unwrap(), json!({"bio": "hi"}));
    }

    #[test]
    fn test_signup_request_uses_camel_case() {
        let req = SignupRequest {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
            handle: "a".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["confirmPassword"], "pw");
    }

    #[test]
    fn test_image_upload_guesses_mime() {
        assert_eq!(
            ImageUpload::from_bytes("me.JPG", vec![]).mime_type,
            "image/jpeg"
        );
        assert_eq!(ImageUpload::from_bytes("me.png", vec![]).mime_type, "image/png");
        assert_eq!(
            ImageUpload::from_bytes("me.gif", vec![]).mime_type,
            "application/octet-stream"
        );
    }
}
