use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Changes, Created, NewRecord, Record, RecordType};

impl ToSql for RecordType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecordType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Income" => Ok(RecordType::Income),
            "Expense" => Ok(RecordType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown record type: {other}").into(),
            )),
        }
    }
}

pub fn create(conn: &Connection, record: &NewRecord) -> Result<Created> {
    conn.execute(
        "INSERT INTO records (date, type, amount, note) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![record.date, record.record_type, record.amount, record.note],
    )?;
    Ok(Created {
        id: conn.last_insert_rowid(),
    })
}

pub fn list(conn: &Connection) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare("SELECT id, date, type, amount, note FROM records ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Record {
                id: row.get(0)?,
                date: row.get(1)?,
                record_type: row.get(2)?,
                amount: row.get(3)?,
                note: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Overwrite every mutable field of the row with `record.id`. A missing id
/// reports zero changes.
pub fn update(conn: &Connection, record: &Record) -> Result<Changes> {
    let changes = conn.execute(
        "UPDATE records SET date = ?1, type = ?2, amount = ?3, note = ?4 WHERE id = ?5",
        rusqlite::params![
            record.date,
            record.record_type,
            record.amount,
            record.note,
            record.id
        ],
    )?;
    Ok(Changes { changes })
}

pub fn delete(conn: &Connection, id: i64) -> Result<Changes> {
    let changes = conn.execute("DELETE FROM records WHERE id = ?1", [id])?;
    Ok(Changes { changes })
}
