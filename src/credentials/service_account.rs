use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PushError, Result};

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Google service-account credentials document
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: Option<String>,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(document: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(document)
            .map_err(|e| PushError::Auth(format!("Malformed credentials document: {}", e)))?;

        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(PushError::Auth(
                "Credentials document is missing client_email or private_key".to_string(),
            ));
        }

        Ok(key)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            PushError::Auth(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&document)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/service_account.json");

    #[test]
    fn test_load_fixture() {
        let key = ServiceAccountKey::from_file(FIXTURE).unwrap();
        assert_eq!(key.project_id.as_deref(), Some("ara-push-test"));
        assert_eq!(key.private_key_id, "test-key-id-0001");
        assert_eq!(
            key.client_email,
            "push-sender@ara-push-test.iam.gserviceaccount.com"
        );
        assert!(key.private_key.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = ServiceAccountKey::from_file(FIXTURE).unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn test_malformed_document_is_auth_error() {
        assert!(matches!(
            ServiceAccountKey::from_json("{not json"),
            Err(PushError::Auth(_))
        ));
        assert!(matches!(
            ServiceAccountKey::from_json(r#"{"private_key_id": "k"}"#),
            Err(PushError::Auth(_))
        ));
    }

    #[test]
    fn test_missing_file_is_auth_error() {
        assert!(matches!(
            ServiceAccountKey::from_file("/nonexistent/credentials.json"),
            Err(PushError::Auth(_))
        ));
    }

    #[test]
    fn test_token_uri_defaults() {
        let key = ServiceAccountKey::from_json(
            r#"{"private_key_id": "k", "private_key": "pem", "client_email": "a@b.c"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }
}
