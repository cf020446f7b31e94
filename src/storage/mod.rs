//! One CRUD contract over the SQLite store and the local JSON object store.
//!
//! The backend is picked once by [`select_backend`] and handed to
//! [`StorageFacade::new`]. The façade refuses every CRUD call until
//! [`StorageFacade::init_db`] has succeeded.

pub mod local;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, TallyError};
use crate::models::{Changes, Created, Credentials, LoginOutcome, NewRecord, Record};
use crate::settings::BackendChoice;

pub use local::LocalBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Sqlite => f.write_str("sqlite"),
            BackendKind::Local => f.write_str("local"),
        }
    }
}

/// A physical record/credential store.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Open the store, create its schema if missing and seed defaults.
    /// Must be safe to call more than once.
    fn init(&mut self) -> Result<()>;

    fn get_records(&self) -> Result<Vec<Record>>;
    fn add_record(&mut self, record: &NewRecord) -> Result<Created>;
    fn update_record(&mut self, record: &Record) -> Result<Changes>;
    fn delete_record(&mut self, id: i64) -> Result<Changes>;
    fn login_user(&self, credentials: &Credentials) -> Result<LoginOutcome>;
}

/// What the running binary can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The native SQLite engine is compiled in and not disabled by settings.
    pub native_bridge: bool,
}

impl HostCapabilities {
    pub fn detect(choice: BackendChoice) -> Self {
        let compiled = cfg!(feature = "sqlite");
        if choice == BackendChoice::Sqlite && !compiled {
            warn!("sqlite backend requested but not compiled in, falling back to the local store");
        }
        let native_bridge = match choice {
            BackendChoice::Local => false,
            BackendChoice::Auto | BackendChoice::Sqlite => compiled,
        };
        Self { native_bridge }
    }
}

pub fn select_backend(caps: &HostCapabilities, data_dir: &Path) -> Box<dyn Backend> {
    #[cfg(feature = "sqlite")]
    {
        if caps.native_bridge {
            debug!(data_dir = %data_dir.display(), "selected sqlite backend");
            return Box::new(SqliteBackend::new(data_dir.join(sqlite::DB_FILE)));
        }
    }
    debug!(
        data_dir = %data_dir.display(),
        native_bridge = caps.native_bridge,
        "selected local object store"
    );
    Box::new(LocalBackend::new(data_dir.join(local::STORE_FILE)))
}

/// Owns the selected backend and enforces initialization before CRUD.
pub struct StorageFacade {
    backend: Box<dyn Backend>,
    ready: bool,
}

impl StorageFacade {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            ready: false,
        }
    }

    /// Build the façade and initialize it in one step.
    pub fn open(backend: Box<dyn Backend>) -> Result<Self> {
        let mut facade = Self::new(backend);
        facade.init_db()?;
        Ok(facade)
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn init_db(&mut self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        self.backend.init()?;
        self.ready = true;
        info!(backend = %self.backend.kind(), "storage initialized");
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(TallyError::StoreUnavailable)
        }
    }

    /// Neither store can hold NaN or infinity: SQLite maps NaN to NULL and the
    /// JSON document writes both as `null`, which no longer parses as a record.
    fn ensure_storable(amount: f64) -> Result<()> {
        if amount.is_finite() {
            Ok(())
        } else {
            Err(TallyError::Validation(format!("amount {amount} cannot be stored")))
        }
    }

    pub fn get_records(&self) -> Result<Vec<Record>> {
        self.ensure_ready()?;
        let records = self.backend.get_records()?;
        debug!(backend = %self.backend.kind(), count = records.len(), "fetched records");
        Ok(records)
    }

    pub fn add_record(&mut self, record: &NewRecord) -> Result<Created> {
        self.ensure_ready()?;
        Self::ensure_storable(record.amount)?;
        let created = self.backend.add_record(record)?;
        debug!(backend = %self.backend.kind(), id = created.id, "added record");
        Ok(created)
    }

    pub fn update_record(&mut self, record: &Record) -> Result<Changes> {
        self.ensure_ready()?;
        Self::ensure_storable(record.amount)?;
        let changes = self.backend.update_record(record)?;
        debug!(backend = %self.backend.kind(), id = record.id, changes = changes.changes, "updated record");
        Ok(changes)
    }

    pub fn delete_record(&mut self, id: i64) -> Result<Changes> {
        self.ensure_ready()?;
        let changes = self.backend.delete_record(id)?;
        debug!(backend = %self.backend.kind(), id, changes = changes.changes, "deleted record");
        Ok(changes)
    }

    pub fn login_user(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        self.ensure_ready()?;
        self.backend.login_user(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordType;

    fn expense(date: &str, amount: f64, note: &str) -> NewRecord {
        NewRecord {
            date: date.to_string(),
            record_type: RecordType::Expense,
            amount,
            note: Some(note.to_string()),
        }
    }

    fn backends(dir: &Path) -> Vec<Box<dyn Backend>> {
        let caps_local = HostCapabilities::detect(BackendChoice::Local);
        #[allow(unused_mut)]
        let mut out = vec![select_backend(&caps_local, &dir.join("local"))];
        #[cfg(feature = "sqlite")]
        {
            std::fs::create_dir_all(dir.join("sqlite")).unwrap();
            let caps = HostCapabilities::detect(BackendChoice::Sqlite);
            out.push(select_backend(&caps, &dir.join("sqlite")));
        }
        out
    }

    #[test]
    fn test_crud_before_init_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for backend in backends(dir.path()) {
            let mut facade = StorageFacade::new(backend);
            assert!(!facade.is_ready());
            assert!(matches!(facade.get_records(), Err(TallyError::StoreUnavailable)));
            assert!(matches!(
                facade.add_record(&expense("2024-01-01", 1.0, "x")),
                Err(TallyError::StoreUnavailable)
            ));
            assert!(matches!(facade.delete_record(1), Err(TallyError::StoreUnavailable)));
            let creds = Credentials {
                username: "admin".to_string(),
                password: "1234".to_string(),
            };
            assert!(matches!(facade.login_user(&creds), Err(TallyError::StoreUnavailable)));
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for backend in backends(dir.path()) {
            let mut facade = StorageFacade::open(backend).unwrap();
            let before = facade.get_records().unwrap();
            facade.init_db().unwrap();
            assert_eq!(facade.get_records().unwrap(), before);
        }
    }

    #[test]
    fn test_added_records_come_back_with_unique_ids() {
        let dir = tempfile::tempdir().unwrap();
        for backend in backends(dir.path()) {
            let mut facade = StorageFacade::open(backend).unwrap();
            let existing = facade.get_records().unwrap();
            let inputs = vec![
                expense("2024-03-01", 10.0, "Food"),
                expense("2024-03-02", 20.0, "Fuel"),
                expense("2024-03-03", 30.0, ""),
            ];
            let ids: Vec<i64> = inputs
                .iter()
                .map(|r| facade.add_record(r).unwrap().id)
                .collect();

            let all = facade.get_records().unwrap();
            assert_eq!(all.len(), existing.len() + inputs.len());
            let mut seen: Vec<i64> = all.iter().map(|r| r.id).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), all.len(), "ids must be unique ({})", facade.kind());
            for (id, input) in ids.iter().zip(&inputs) {
                let stored = all.iter().find(|r| r.id == *id).unwrap();
                assert_eq!(stored, &input.clone().with_id(*id));
            }
        }
    }

    #[test]
    fn test_update_and_delete_semantics_match_across_backends() {
        let dir = tempfile::tempdir().unwrap();
        for backend in backends(dir.path()) {
            let mut facade = StorageFacade::open(backend).unwrap();
            let id = facade.add_record(&expense("2024-03-01", 10.0, "Food")).unwrap().id;
            let before = facade.get_records().unwrap();

            let missing = expense("2024-03-01", 99.0, "Ghost").with_id(id + 1000);
            assert_eq!(facade.update_record(&missing).unwrap().changes, 0);
            assert_eq!(facade.get_records().unwrap(), before);

            let edited = expense("2024-04-01", 12.5, "Groceries").with_id(id);
            assert_eq!(facade.update_record(&edited).unwrap().changes, 1);
            let after = facade.get_records().unwrap();
            for (old, new) in before.iter().zip(&after) {
                if old.id == id {
                    assert_eq!(new, &edited);
                } else {
                    assert_eq!(new, old);
                }
            }

            assert_eq!(facade.delete_record(id).unwrap().changes, 1);
            assert_eq!(facade.delete_record(id).unwrap().changes, 0);
            assert!(facade.get_records().unwrap().iter().all(|r| r.id != id));
        }
    }

    #[test]
    fn test_non_finite_amounts_are_rejected_and_store_stays_readable() {
        let dir = tempfile::tempdir().unwrap();
        for (i, backend) in backends(dir.path()).into_iter().enumerate() {
            let mut facade = StorageFacade::open(backend).unwrap();
            let kind = facade.kind();
            let id = facade.add_record(&expense("2024-03-01", 10.0, "Food")).unwrap().id;
            let before = facade.get_records().unwrap();

            for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                assert!(
                    matches!(facade.add_record(&expense("2024-03-02", bad, "x")), Err(TallyError::Validation(_))),
                    "add {bad} ({kind})"
                );
                assert!(
                    matches!(
                        facade.update_record(&expense("2024-03-02", bad, "x").with_id(id)),
                        Err(TallyError::Validation(_))
                    ),
                    "update {bad} ({kind})"
                );
            }
            assert_eq!(facade.get_records().unwrap(), before);
            drop(facade);

            let reopened = StorageFacade::open(backends(dir.path()).remove(i)).unwrap();
            assert_eq!(reopened.get_records().unwrap(), before);
        }
    }

    #[test]
    fn test_login_uses_seeded_credential() {
        let dir = tempfile::tempdir().unwrap();
        for backend in backends(dir.path()) {
            let facade = StorageFacade::open(backend).unwrap();
            let good = Credentials {
                username: "admin".to_string(),
                password: "1234".to_string(),
            };
            let bad = Credentials {
                username: "admin".to_string(),
                password: "4321".to_string(),
            };
            assert!(facade.login_user(&good).unwrap().success);
            assert!(!facade.login_user(&bad).unwrap().success);
        }
    }

    #[test]
    fn test_capability_detection() {
        assert!(!HostCapabilities::detect(BackendChoice::Local).native_bridge);
        assert_eq!(
            HostCapabilities::detect(BackendChoice::Auto).native_bridge,
            cfg!(feature = "sqlite")
        );
    }

    #[test]
    fn test_select_backend_honors_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let local = select_backend(&HostCapabilities { native_bridge: false }, dir.path());
        assert_eq!(local.kind(), BackendKind::Local);
        #[cfg(feature = "sqlite")]
        {
            let native = select_backend(&HostCapabilities { native_bridge: true }, dir.path());
            assert_eq!(native.kind(), BackendKind::Sqlite);
        }
    }
}
