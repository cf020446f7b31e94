use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::Result;
use crate::password::{PasswordHash, DEFAULT_PASSWORD, DEFAULT_USERNAME};

/// Insert the default credential if the user table is empty. Returns whether
/// a row was inserted.
pub fn ensure_seeded(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT count(*) FROM users", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(false);
    }
    let stored = PasswordHash::new(DEFAULT_PASSWORD);
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3)",
        rusqlite::params![DEFAULT_USERNAME, stored.hash, stored.salt],
    )?;
    if inserted > 0 {
        info!(username = DEFAULT_USERNAME, "seeded default credential");
    }
    Ok(inserted > 0)
}

/// Exact username lookup followed by a constant-time password comparison.
/// Unknown users yield `false`, never an error.
pub fn verify(conn: &Connection, username: &str, password: &str) -> Result<bool> {
    let stored: Option<PasswordHash> = conn
        .query_row(
            "SELECT password_hash, salt FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(PasswordHash {
                    hash: row.get(0)?,
                    salt: row.get(1)?,
                })
            },
        )
        .optional()?;
    let ok = stored.is_some_and(|s| s.matches(password));
    debug!(username, success = ok, "credential check");
    Ok(ok)
}
