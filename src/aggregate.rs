use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use crate::models::{Record, RecordType};

pub const UNCATEGORIZED: &str = "Uncategorized";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse the date forms a record may carry.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub savings: f64,
    pub savings_percentage: f64,
}

pub fn totals(records: &[Record]) -> Totals {
    let sum = |t: RecordType| -> f64 {
        records
            .iter()
            .filter(|r| r.record_type == t)
            .map(|r| r.amount)
            .sum()
    };
    let income = sum(RecordType::Income);
    let expense = sum(RecordType::Expense);
    let savings = income - expense;
    let savings_percentage = if income > 0.0 {
        savings / income * 100.0
    } else {
        0.0
    };
    Totals {
        income,
        expense,
        savings,
        savings_percentage,
    }
}

// ---------------------------------------------------------------------------
// Expense distribution
// ---------------------------------------------------------------------------

/// The grouping key for a note: trimmed text, or `Uncategorized` when blank.
pub fn category_of(note: Option<&str>) -> &str {
    match note.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => UNCATEGORIZED,
    }
}

/// Sum expense amounts per category. Income records are ignored.
pub fn by_category(records: &[Record]) -> BTreeMap<String, f64> {
    let mut grouped: BTreeMap<String, f64> = BTreeMap::new();
    for r in records.iter().filter(|r| r.record_type == RecordType::Expense) {
        *grouped
            .entry(category_of(r.note.as_deref()).to_string())
            .or_default() += r.amount;
    }
    grouped
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

/// Bucket by calendar month, oldest first. Records whose date does not parse
/// are logged and skipped.
pub fn by_month(records: &[Record]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for r in records {
        let Some(date) = parse_record_date(&r.date) else {
            warn!(id = r.id, date = %r.date, "skipping record with invalid date");
            continue;
        };
        let slot = months.entry((date.year(), date.month())).or_default();
        match r.record_type {
            RecordType::Income => slot.0 += r.amount,
            RecordType::Expense => slot.1 += r.amount,
        }
    }
    months
        .into_iter()
        .map(|((year, month), (income, expense))| MonthBucket {
            label: month_label(year, month),
            income,
            expense,
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year:04}-{month:02}"))
}

// ---------------------------------------------------------------------------
// Dashboard / chart feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub labels: Vec<String>,
    pub income: Vec<f64>,
    pub expense: Vec<f64>,
}

/// All derived views of one record list, shaped for chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub totals: Totals,
    pub overview: Series,
    pub by_category: Series,
    pub by_month: MonthlySeries,
}

impl Dashboard {
    pub fn from_records(records: &[Record]) -> Self {
        let totals = totals(records);
        let overview = Series {
            labels: vec!["Income".into(), "Expense".into(), "Savings".into()],
            values: vec![totals.income, totals.expense, totals.savings],
        };

        let categories = by_category(records);
        let by_category = Series {
            labels: categories.keys().cloned().collect(),
            values: categories.values().copied().collect(),
        };

        let buckets = by_month(records);
        let by_month = MonthlySeries {
            labels: buckets.iter().map(|b| b.label.clone()).collect(),
            income: buckets.iter().map(|b| b.income).collect(),
            expense: buckets.iter().map(|b| b.expense).collect(),
        };

        Dashboard {
            totals,
            overview,
            by_category,
            by_month,
        }
    }
}
