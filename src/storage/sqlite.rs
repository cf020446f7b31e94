use std::path::PathBuf;

use rusqlite::Connection;

use super::{Backend, BackendKind};
use crate::db::{get_connection, init_db};
use crate::error::{Result, TallyError};
use crate::models::{Changes, Created, Credentials, LoginOutcome, NewRecord, Record};
use crate::{records, users};

pub const DB_FILE: &str = "tally.db";

/// Desktop store. The connection exists only after `init`.
pub struct SqliteBackend {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SqliteBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path, conn: None }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(TallyError::StoreUnavailable)
    }
}

impl Backend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn init(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = get_connection(&self.path)?;
        init_db(&conn)?;
        self.conn = Some(conn);
        Ok(())
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        records::list(self.conn()?)
    }

    fn add_record(&mut self, record: &NewRecord) -> Result<Created> {
        records::create(self.conn()?, record)
    }

    fn update_record(&mut self, record: &Record) -> Result<Changes> {
        records::update(self.conn()?, record)
    }

    fn delete_record(&mut self, id: i64) -> Result<Changes> {
        records::delete(self.conn()?, id)
    }

    fn login_user(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let success = users::verify(self.conn()?, &credentials.username, &credentials.password)?;
        Ok(LoginOutcome { success })
    }
}
