//! Bearer token persistence.
//!
//! The token lives in two places: a durable [`CredentialStore`] (so a later
//! run can restore the session) and the `Authorization` slot of the
//! [`ApiClient`] (so every later request carries it). Tokens are never
//! logged.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::config::paths;

/// Storage key holding the `Bearer <token>` value.
pub const TOKEN_KEY: &str = "FBIdToken";

/// Formats a raw token as an `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Durable key-value storage for credentials.
pub trait CredentialStore: Send + Sync {
    /// # Errors
    /// Returns an error if the storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn remove(&self, key: &str) -> Result<Option<String>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

/// Credentials kept in a JSON file with restricted permissions (0600).
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new(paths::credentials_path())
    }
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CredentialFile> {
        if !self.path.exists() {
            return Ok(CredentialFile::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", self.path.display()))
    }

    fn write(&self, file: &CredentialFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(file).context("Failed to serialize credentials")?;

        #[cfg(unix)]
        {
            use std::fs::OpenOptions;
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut handle = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            handle
                .write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.entries.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut file = self.read()?;
        file.entries.insert(key.to_string(), value.to_string());
        self.write(&file)
    }

    fn remove(&self, key: &str) -> Result<Option<String>> {
        let mut file = self.read()?;
        let removed = file.entries.remove(key);
        if removed.is_some() {
            self.write(&file)?;
        }
        Ok(removed)
    }
}

/// In-process store for embedders that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().remove(key))
    }
}

/// Persists `Bearer <token>` and installs it on the client.
///
/// # Errors
/// Returns an error if the store cannot be written. The client header is
/// only installed once the token is persisted.
pub fn set_authorization_header(
    token: &str,
    store: &dyn CredentialStore,
    client: &ApiClient,
) -> Result<()> {
    let value = bearer(token);
    store
        .save(TOKEN_KEY, &value)
        .context("Failed to persist auth token")?;
    client.set_authorization(Some(value));
    Ok(())
}

/// Clears the client header and removes the persisted token.
///
/// # Errors
/// Returns an error if the store cannot be written. The client header is
/// cleared regardless.
pub fn clear_authorization_header(store: &dyn CredentialStore, client: &ApiClient) -> Result<()> {
    client.set_authorization(None);
    store
        .remove(TOKEN_KEY)
        .context("Failed to remove auth token")?;
    Ok(())
}

/// Reads the persisted `Bearer <token>` value, if any.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn stored_authorization(store: &dyn CredentialStore) -> Result<Option<String>> {
    store.load(TOKEN_KEY)
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: Option<u64>,
}

/// Returns the `exp` claim (seconds since epoch) of a JWT bearer value.
///
/// Accepts the raw token or the `Bearer <token>` form. Returns `None` when
/// the token is not a JWT or carries no expiry.
pub fn token_expiry(value: &str) -> Option<u64> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<JwtClaims>(&bytes).ok()?.exp
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Returns true if the token carries an expiry that has passed.
///
/// Tokens without a readable expiry are treated as valid; the backend is
/// the authority and will reject them.
pub fn is_expired(value: &str) -> bool {
    token_expiry(value).is_some_and(|exp| exp <= now_secs())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn jwt_with_exp(exp: u64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("{header}.{claims}.sig")
    }

    fn client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9", None).unwrap()
    }

    #[test]
    fn test_bearer_format() {
        assert_eq!(bearer("abc"), "Bearer abc");
    }

    #[test]
    fn test_file_store_round_trip_and_remove() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credentials.json"));

        assert_eq!(store.load(TOKEN_KEY).unwrap(), None);
        store.save(TOKEN_KEY, "Bearer abc").unwrap();
        assert_eq!(store.load(TOKEN_KEY).unwrap().as_deref(), Some("Bearer abc"));

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains(TOKEN_KEY));

        assert_eq!(
            store.remove(TOKEN_KEY).unwrap().as_deref(),
            Some("Bearer abc")
        );
        assert_eq!(store.load(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.remove(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.save("other", "x").unwrap();
        store.save(TOKEN_KEY, "Bearer abc").unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.load("other").unwrap().as_deref(), Some("x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.save(TOKEN_KEY, "Bearer abc").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_set_and_clear_authorization_header() {
        let store = MemoryCredentialStore::default();
        let api = client();

        set_authorization_header("tok", &store, &api).unwrap();
        assert_eq!(api.authorization().as_deref(), Some("Bearer tok"));
        assert_eq!(
            stored_authorization(&store).unwrap().as_deref(),
            Some("Bearer tok")
        );

        clear_authorization_header(&store, &api).unwrap();
        assert_eq!(api.authorization(), None);
        assert_eq!(stored_authorization(&store).unwrap(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let store = MemoryCredentialStore::default();
        let api = client();
        set_authorization_header("first", &store, &api).unwrap();
        set_authorization_header("second", &store, &api).unwrap();
        assert_eq!(api.authorization().as_deref(), Some("Bearer second"));
        assert_eq!(
            stored_authorization(&store).unwrap().as_deref(),
            Some("Bearer second")
        );
    }

    #[test]
    fn test_token_expiry_reads_exp_claim() {
        let token = jwt_with_exp(1_700_000_000);
        assert_eq!(token_expiry(&token), Some(1_700_000_000));
        assert_eq!(token_expiry(&bearer(&token)), Some(1_700_000_000));
    }

    #[test]
    fn test_token_expiry_ignores_opaque_tokens() {
        assert_eq!(token_expiry("Bearer opaque"), None);
        assert_eq!(token_expiry("a.!!!.c"), None);
        assert!(!is_expired("Bearer opaque"));
    }

    #[test]
    fn test_is_expired() {
        assert!(is_expired(&bearer(&jwt_with_exp(1))));
        assert!(!is_expired(&bearer(&jwt_with_exp(now_secs() + 3600))));
    }
}
