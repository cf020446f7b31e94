use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::parse_record_date;
use crate::error::{Result, TallyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Income,
    Expense,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Income => "Income",
            RecordType::Expense => "Expense",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(RecordType::Income),
            "expense" => Ok(RecordType::Expense),
            other => Err(TallyError::Validation(format!(
                "unknown record type '{other}' (expected income or expense)"
            ))),
        }
    }
}

/// A persisted income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Record fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub date: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewRecord {
    pub fn with_id(self, id: i64) -> Record {
        Record {
            id,
            date: self.date,
            record_type: self.record_type,
            amount: self.amount,
            note: self.note,
        }
    }

    /// Form-level checks. Stores accept anything; the CLI calls this before
    /// handing a record to the façade.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.date, self.amount)
    }
}

impl Record {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.date, self.amount)
    }
}

fn validate_fields(date: &str, amount: f64) -> Result<()> {
    if date.trim().is_empty() {
        return Err(TallyError::Validation("date is required".to_string()));
    }
    if parse_record_date(date).is_none() {
        return Err(TallyError::Validation(format!("'{date}' is not a valid date")));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(TallyError::Validation(
            "amount must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Changes {
    pub changes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
}
