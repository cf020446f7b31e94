use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Backend, BackendKind};
use crate::error::{Result, TallyError};
use crate::models::{
    Changes, Created, Credentials, LoginOutcome, NewRecord, Record, RecordType,
};
use crate::password::{PasswordHash, DEFAULT_PASSWORD, DEFAULT_USERNAME};

pub const STORE_FILE: &str = "tally.json";

// (date, type, amount, note)
const SAMPLE_RECORDS: &[(&str, RecordType, f64, &str)] = &[
    ("2024-01-15", RecordType::Income, 50000.0, "Salary"),
    ("2024-01-16", RecordType::Expense, 5000.0, "Karachi Committee"),
    ("2024-01-17", RecordType::Expense, 3000.0, "Medicine"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    id: i64,
    username: String,
    password_hash: String,
    salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    next_id: i64,
    #[serde(default)]
    records: Vec<Record>,
    #[serde(default)]
    users: Vec<StoredUser>,
}

impl Document {
    fn with_samples() -> Self {
        let mut doc = Document {
            next_id: 1,
            records: Vec::new(),
            users: Vec::new(),
        };
        for (date, record_type, amount, note) in SAMPLE_RECORDS {
            let id = doc.allocate_id();
            doc.records.push(Record {
                id,
                date: date.to_string(),
                record_type: *record_type,
                amount: *amount,
                note: Some(note.to_string()),
            });
        }
        doc
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns whether the default credential was added.
    fn ensure_seeded(&mut self) -> bool {
        if !self.users.is_empty() {
            return false;
        }
        let stored = PasswordHash::new(DEFAULT_PASSWORD);
        self.users.push(StoredUser {
            id: 1,
            username: DEFAULT_USERNAME.to_string(),
            password_hash: stored.hash,
            salt: stored.salt,
        });
        true
    }
}

/// Object store kept as one JSON document on disk. Each mutation rewrites the
/// whole document through a temp file and rename.
pub struct LocalBackend {
    path: PathBuf,
    doc: Option<Document>,
}

impl LocalBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path, doc: None }
    }

    fn doc(&self) -> Result<&Document> {
        self.doc.as_ref().ok_or(TallyError::StoreUnavailable)
    }

    fn persist(&self, doc: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, format!("{json}\n"))?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `f` to a copy of the document and commit it only if persisting
    /// succeeds, so a failed write leaves the in-memory state unchanged.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Document) -> T) -> Result<T> {
        let mut next = self.doc()?.clone();
        let out = f(&mut next);
        self.persist(&next)?;
        self.doc = Some(next);
        Ok(out)
    }
}

impl Backend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn init(&mut self) -> Result<()> {
        if self.doc.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let (mut doc, mut dirty) = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            (serde_json::from_str::<Document>(&content)?, false)
        } else {
            info!(path = %self.path.display(), "creating local store with sample records");
            (Document::with_samples(), true)
        };
        if doc.ensure_seeded() {
            info!(username = DEFAULT_USERNAME, "seeded default credential");
            dirty = true;
        }
        if dirty {
            self.persist(&doc)?;
        }
        self.doc = Some(doc);
        Ok(())
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        Ok(self.doc()?.records.clone())
    }

    fn add_record(&mut self, record: &NewRecord) -> Result<Created> {
        let record = record.clone();
        self.mutate(|doc| {
            let id = doc.allocate_id();
            doc.records.push(record.with_id(id));
            Created { id }
        })
    }

    fn update_record(&mut self, record: &Record) -> Result<Changes> {
        if !self.doc()?.records.iter().any(|r| r.id == record.id) {
            return Ok(Changes { changes: 0 });
        }
        self.mutate(|doc| {
            let mut changes = 0;
            for slot in doc.records.iter_mut().filter(|r| r.id == record.id) {
                *slot = record.clone();
                changes += 1;
            }
            Changes { changes }
        })
    }

    fn delete_record(&mut self, id: i64) -> Result<Changes> {
        if !self.doc()?.records.iter().any(|r| r.id == id) {
            return Ok(Changes { changes: 0 });
        }
        self.mutate(|doc| {
            let before = doc.records.len();
            doc.records.retain(|r| r.id != id);
            Changes {
                changes: before - doc.records.len(),
            }
        })
    }

    fn login_user(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let success = self
            .doc()?
            .users
            .iter()
            .find(|u| u.username == credentials.username)
            .is_some_and(|u| {
                PasswordHash {
                    salt: u.salt.clone(),
                    hash: u.password_hash.clone(),
                }
                .matches(&credentials.password)
            });
        Ok(LoginOutcome { success })
    }
}
