//! # Persisted Session
//!
//! The authentication subtree is the only part of the store that survives a restart.
//! It is written under a single storage key, `persist:<app-id>:v<schema>`. There is no
//! migration between schema versions: a structural change bumps
//! [`SESSION_SCHEMA_VERSION`], which moves the session to a fresh key.
//!
//! A blob that fails to load or deserialize is discarded and the store starts logged out.

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Bump on any structural change to [`Session`].
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Storage key for an application's session blob.
pub fn storage_key(app_id: &str) -> String {
    format!("persist:{app_id}:v{SESSION_SCHEMA_VERSION}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Authentication state: bearer token, granted permission codes and the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub user: Option<CurrentUser>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Capability check used to gate actions (e.g. `"brand.create"`).
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

struct Inner {
    storage: Arc<dyn Storage>,
    key: String,
    state: watch::Sender<Session>,
}

/// Shared handle to the persisted session.
///
/// Cloned into the HTTP adapter (bearer token, invalidation on 401/403), the auth client
/// (sign in/out) and the store root (snapshot, permission checks).
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.inner.key)
            .field("authenticated", &self.current().is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Loads the session for `app_id`, falling back to logged out on any failure.
    pub fn restore(storage: Arc<dyn Storage>, app_id: &str) -> Self {
        let key = storage_key(app_id);
        let session = match storage.load(&key) {
            Ok(Some(blob)) => match serde_json::from_str::<Session>(&blob) {
                Ok(session) => {
                    info!(%key, authenticated = session.is_authenticated(), "Session restored");
                    session
                }
                Err(e) => {
                    warn!(%key, error = %e, "Discarding unreadable session");
                    Session::default()
                }
            },
            Ok(None) => Session::default(),
            Err(e) => {
                warn!(%key, error = %e, "Session storage unavailable");
                Session::default()
            }
        };
        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(Inner {
                storage,
                key,
                state,
            }),
        }
    }

    /// An empty, non-durable session (nothing restored, nothing written to disk).
    pub fn ephemeral(app_id: &str) -> Self {
        Self::restore(Arc::new(MemoryStorage::new()), app_id)
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn current(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state.borrow().access_token.clone()
    }

    pub fn can(&self, permission: &str) -> bool {
        self.inner.state.borrow().can(permission)
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Replaces the session and persists it.
    pub fn sign_in(&self, session: Session) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&session)?;
        self.inner.storage.save(&self.inner.key, &blob)?;
        info!(key = %self.inner.key, "Session stored");
        self.inner.state.send_replace(session);
        Ok(())
    }

    /// Clears the in-memory session and its persisted blob.
    pub fn invalidate(&self) {
        if let Err(e) = self.inner.storage.remove(&self.inner.key) {
            warn!(key = %self.inner.key, error = %e, "Failed to remove persisted session");
        }
        let was_authenticated = self.inner.state.send_replace(Session::default()).is_authenticated();
        if was_authenticated {
            info!(key = %self.inner.key, "Session invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> Session {
        Session {
            access_token: Some("token-1".into()),
            permissions: vec!["brand.create".into(), "brand.delete".into()],
            user: Some(CurrentUser {
                id: 7,
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: Some("admin".into()),
            }),
        }
    }

    #[test]
    fn test_key_is_namespaced_and_versioned() {
        assert_eq!(storage_key("acme"), "persist:acme:v1");
    }

    #[test]
    fn test_sign_in_survives_restore() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage.clone(), "acme");
        session.sign_in(signed_in()).unwrap();

        let restored = SessionStore::restore(storage, "acme");
        assert_eq!(restored.current(), signed_in());
        assert_eq!(restored.access_token().as_deref(), Some("token-1"));
        assert!(restored.can("brand.delete"));
        assert!(!restored.can("role.delete"));
    }

    #[test]
    fn test_corrupted_blob_restores_logged_out() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.save(&storage_key("acme"), "{not json").unwrap();

        let session = SessionStore::restore(storage, "acme");
        assert_eq!(session.current(), Session::default());
        assert!(!session.current().is_authenticated());
    }

    #[test]
    fn test_wrong_shape_restores_logged_out() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .save(&storage_key("acme"), r#"{"accessToken": 42, "permissions": "all"}"#)
            .unwrap();

        let session = SessionStore::restore(storage, "acme");
        assert_eq!(session.current(), Session::default());
    }

    #[test]
    fn test_invalidate_clears_storage_and_notifies() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage.clone(), "acme");
        session.sign_in(signed_in()).unwrap();
        let mut rx = session.subscribe();

        session.invalidate();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_authenticated());
        assert_eq!(storage.load(session.key()).unwrap(), None);
    }

    #[test]
    fn test_file_backed_restore_with_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));
        std::fs::write(storage.path_for(&storage_key("acme")), b"\x00\x01garbage").unwrap();

        let session = SessionStore::restore(storage, "acme");
        assert!(!session.current().is_authenticated());
    }
}
