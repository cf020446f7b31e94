use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TallyError};
use crate::models::Credentials;
use crate::settings::config_dir;
use crate::storage::StorageFacade;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

#[derive(Serialize, Deserialize)]
struct FlagFile {
    logged_in: bool,
}

/// The persisted "currently authenticated" boolean. Absent or unreadable
/// means logged out.
#[derive(Debug, Clone)]
pub struct SessionFlag {
    path: PathBuf,
}

impl SessionFlag {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Self {
        Self::new(config_dir().join(SESSION_FILE))
    }

    pub fn is_set(&self) -> bool {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str::<FlagFile>(&s).ok())
            .is_some_and(|f| f.logged_in)
    }

    pub fn set(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&FlagFile { logged_in: true })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// LoggedOut --(verified credentials)--> LoggedIn --(logout)--> LoggedOut
pub struct AuthGate {
    flag: SessionFlag,
}

impl AuthGate {
    pub fn new(flag: SessionFlag) -> Self {
        Self { flag }
    }

    pub fn state(&self) -> SessionState {
        session_state(&self.flag)
    }

    pub fn login(&self, storage: &StorageFacade, credentials: &Credentials) -> Result<SessionState> {
        let outcome = storage.login_user(credentials)?;
        info!(username = %credentials.username, success = outcome.success, "login attempt");
        if !outcome.success {
            return Ok(SessionState::LoggedOut);
        }
        self.flag.set()?;
        Ok(SessionState::LoggedIn)
    }

    pub fn logout(&self) -> Result<SessionState> {
        self.flag.clear()?;
        Ok(SessionState::LoggedOut)
    }
}

pub fn session_state(flag: &SessionFlag) -> SessionState {
    if flag.is_set() {
        SessionState::LoggedIn
    } else {
        SessionState::LoggedOut
    }
}

/// Gate for commands that need an authenticated session.
pub fn require_login(flag: &SessionFlag) -> Result<()> {
    match session_state(flag) {
        SessionState::LoggedIn => Ok(()),
        SessionState::LoggedOut => Err(TallyError::NotLoggedIn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{select_backend, HostCapabilities};

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn facade(dir: &tempfile::TempDir) -> StorageFacade {
        let caps = HostCapabilities { native_bridge: false };
        StorageFacade::open(select_backend(&caps, &dir.path().join("data"))).unwrap()
    }

    #[test]
    fn test_flag_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let flag = SessionFlag::new(dir.path().join("nested").join(SESSION_FILE));
        assert!(!flag.is_set());
        flag.set().unwrap();
        assert!(flag.is_set());
        flag.clear().unwrap();
        assert!(!flag.is_set());
        flag.clear().unwrap();
    }

    #[test]
    fn test_garbage_flag_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, "true").unwrap();
        assert!(!SessionFlag::new(path.clone()).is_set());
        std::fs::write(&path, r#"{"logged_in": false}"#).unwrap();
        assert!(!SessionFlag::new(path).is_set());
    }

    #[test]
    fn test_login_success_sets_flag() {
        let dir = tempfile::tempdir().unwrap();
        let storage = facade(&dir);
        let flag = SessionFlag::new(dir.path().join(SESSION_FILE));
        let gate = AuthGate::new(flag.clone());
        assert_eq!(gate.state(), SessionState::LoggedOut);
        assert_eq!(gate.login(&storage, &creds("admin", "1234")).unwrap(), SessionState::LoggedIn);
        assert_eq!(gate.state(), SessionState::LoggedIn);
        assert!(require_login(&flag).is_ok());
    }

    #[test]
    fn test_invalid_credentials_stay_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let storage = facade(&dir);
        let flag = SessionFlag::new(dir.path().join(SESSION_FILE));
        let gate = AuthGate::new(flag.clone());
        assert_eq!(gate.login(&storage, &creds("admin", "wrong")).unwrap(), SessionState::LoggedOut);
        assert!(!flag.is_set());
        assert!(matches!(require_login(&flag), Err(TallyError::NotLoggedIn)));
    }

    #[test]
    fn test_logout_returns_to_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let storage = facade(&dir);
        let gate = AuthGate::new(SessionFlag::new(dir.path().join(SESSION_FILE)));
        gate.login(&storage, &creds("admin", "1234")).unwrap();
        assert_eq!(gate.logout().unwrap(), SessionState::LoggedOut);
        assert_eq!(gate.state(), SessionState::LoggedOut);
    }

    #[test]
    fn test_login_on_uninitialized_storage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let caps = HostCapabilities { native_bridge: false };
        let storage = StorageFacade::new(select_backend(&caps, dir.path()));
        let flag = SessionFlag::new(dir.path().join(SESSION_FILE));
        let gate = AuthGate::new(flag.clone());
        assert!(matches!(
            gate.login(&storage, &creds("admin", "1234")),
            Err(TallyError::StoreUnavailable)
        ));
        assert!(!flag.is_set());
    }
}
