//! Credential storage and the "get a usable token" policy.
//!
//! The credential lives in a single toml file. Its absence or corruption is
//! never fatal: the `OAuthFlow` is asked for a fresh consent instead.
//! Deleting the file is how a user logs out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::base_dir;
use crate::error::{AuthError, GridcalResult};

/// Refresh this long before the recorded expiry.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// An OAuth access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn from_tokens(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Credential {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// The on-disk credential file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    /// `~/.config/gridcal/session.toml`
    pub fn default_path() -> GridcalResult<PathBuf> {
        Ok(base_dir()?.join("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Credential, AuthError> {
        if !self.path.exists() {
            return Err(AuthError::Missing(self.path.clone()));
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| AuthError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| AuthError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        let contents = toml::to_string_pretty(credential).map_err(|e| AuthError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, contents)?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Delete the file. Returns whether there was one.
    pub fn remove(&self) -> Result<bool, AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// The interactive half of authentication.
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    /// Ask the user to grant access and return the resulting tokens.
    async fn consent(&self) -> Result<Credential, AuthError>;

    /// Exchange the refresh token for a new access token.
    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError>;
}

pub struct Authenticator<F> {
    store: CredentialStore,
    flow: F,
}

impl<F: OAuthFlow> Authenticator<F> {
    pub fn new(store: CredentialStore, flow: F) -> Self {
        Authenticator { store, flow }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Load the saved credential, refreshing or re-consenting as needed.
    /// Whatever is obtained from the flow is saved before it is returned.
    pub async fn get_valid_credential(&self) -> Result<Credential, AuthError> {
        let saved = match self.store.load() {
            Ok(credential) => credential,
            Err(AuthError::Missing(path)) => {
                info!("No saved credential at {}, starting authorization", path.display());
                return self.consent().await;
            }
            Err(e) => {
                warn!("{}; starting authorization", e);
                return self.consent().await;
            }
        };

        if !saved.is_expired() {
            return Ok(saved);
        }

        debug!("Access token expired at {}, refreshing", saved.expires_at);
        match self.flow.refresh(&saved).await {
            Ok(mut refreshed) => {
                // Refresh responses usually omit the refresh token
                if refreshed.refresh_token.is_empty() {
                    refreshed.refresh_token = saved.refresh_token;
                }
                self.store.save(&refreshed)?;
                Ok(refreshed)
            }
            Err(e) => {
                warn!("{}; starting authorization", e);
                self.consent().await
            }
        }
    }

    /// Forget the saved credential.
    pub fn logout(&self) -> Result<(), AuthError> {
        if self.store.remove()? {
            info!("Removed credential at {}", self.store.path().display());
        }
        Ok(())
    }

    async fn consent(&self) -> Result<Credential, AuthError> {
        let credential = self.flow.consent().await?;
        self.store.save(&credential)?;
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ScriptedFlow {
        consents: Mutex<u32>,
        refreshes: Mutex<u32>,
        refresh_fails: bool,
    }

    impl ScriptedFlow {
        fn consents(&self) -> u32 {
            *self.consents.lock().unwrap()
        }

        fn refreshes(&self) -> u32 {
            *self.refreshes.lock().unwrap()
        }
    }

    #[async_trait]
    impl OAuthFlow for ScriptedFlow {
        async fn consent(&self) -> Result<Credential, AuthError> {
            *self.consents.lock().unwrap() += 1;
            Ok(Credential::from_tokens("consented".into(), "refresh-1".into(), 3600))
        }

        async fn refresh(&self, _credential: &Credential) -> Result<Credential, AuthError> {
            *self.refreshes.lock().unwrap() += 1;
            if self.refresh_fails {
                return Err(AuthError::RefreshFailed("invalid_grant".into()));
            }
            Ok(Credential::from_tokens("refreshed".into(), String::new(), 3600))
        }
    }

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("session.toml"))
    }

    fn expired() -> Credential {
        Credential {
            access_token: "stale".into(),
            refresh_token: "refresh-0".into(),
            expires_at: Utc::now() - Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn missing_file_triggers_consent_and_is_saved() {
        let dir = TempDir::new().unwrap();
        let auth = Authenticator::new(store_in(&dir), ScriptedFlow::default());

        let credential = auth.get_valid_credential().await.unwrap();
        assert_eq!(credential.access_token, "consented");
        assert_eq!(auth.flow.consents(), 1);
        assert_eq!(auth.store().load().unwrap(), credential);
    }

    #[tokio::test]
    async fn valid_saved_credential_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let saved = Credential::from_tokens("fresh".into(), "r".into(), 3600);
        store.save(&saved).unwrap();

        let auth = Authenticator::new(store, ScriptedFlow::default());
        assert_eq!(auth.get_valid_credential().await.unwrap(), saved);
        assert_eq!(auth.flow.consents(), 0);
        assert_eq!(auth.flow.refreshes(), 0);
    }

    #[tokio::test]
    async fn corrupt_file_triggers_consent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "access_token = [not toml").unwrap();
        assert!(matches!(store.load(), Err(AuthError::Corrupt { .. })));

        let auth = Authenticator::new(store, ScriptedFlow::default());
        let credential = auth.get_valid_credential().await.unwrap();
        assert_eq!(credential.access_token, "consented");
        assert_eq!(auth.flow.consents(), 1);
    }

    #[tokio::test]
    async fn expired_credential_is_refreshed_keeping_refresh_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&expired()).unwrap();

        let auth = Authenticator::new(store, ScriptedFlow::default());
        let credential = auth.get_valid_credential().await.unwrap();

        assert_eq!(credential.access_token, "refreshed");
        assert_eq!(credential.refresh_token, "refresh-0");
        assert_eq!(auth.flow.refreshes(), 1);
        assert_eq!(auth.flow.consents(), 0);
        assert_eq!(auth.store().load().unwrap(), credential);
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_consent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&expired()).unwrap();

        let flow = ScriptedFlow {
            refresh_fails: true,
            ..Default::default()
        };
        let auth = Authenticator::new(store, flow);
        let credential = auth.get_valid_credential().await.unwrap();

        assert_eq!(credential.access_token, "consented");
        assert_eq!(auth.flow.refreshes(), 1);
        assert_eq!(auth.flow.consents(), 1);
    }

    #[tokio::test]
    async fn logout_deletes_file_and_next_start_consents() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&Credential::from_tokens("fresh".into(), "r".into(), 3600))
            .unwrap();

        let auth = Authenticator::new(store.clone(), ScriptedFlow::default());
        auth.logout().unwrap();
        assert!(!store.exists());

        // Logging out twice is fine
        auth.logout().unwrap();

        let restarted = Authenticator::new(store, ScriptedFlow::default());
        restarted.get_valid_credential().await.unwrap();
        assert_eq!(restarted.flow.consents(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&Credential::from_tokens("a".into(), "r".into(), 10))
            .unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn expiry_includes_leeway() {
        let now = Utc::now();
        let credential = Credential {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(credential.is_expired_at(now));
        assert!(!credential.is_expired_at(now - Duration::minutes(5)));
    }
}
