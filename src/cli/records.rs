use chrono::Datelike;
use comfy_table::{Cell, CellAlignment, Table};

use crate::aggregate::parse_record_date;
use crate::cli::{confirm, open_storage, parse_month_opt};
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::models::{NewRecord, Record, RecordType};
use crate::session::{require_login, SessionFlag};
use crate::settings::Settings;

fn blank_to_none(note: Option<String>) -> Option<String> {
    note.filter(|n| !n.trim().is_empty())
}

pub fn add(
    settings: &Settings,
    date: &str,
    record_type: &str,
    amount: f64,
    note: Option<String>,
) -> Result<()> {
    require_login(&SessionFlag::default_location())?;
    let record = NewRecord {
        date: date.trim().to_string(),
        record_type: record_type.parse()?,
        amount,
        note: blank_to_none(note),
    };
    record.validate()?;

    let mut storage = open_storage(settings)?;
    let created = storage.add_record(&record)?;
    println!(
        "Added {} #{}: {} on {}",
        record.record_type,
        created.id,
        money(record.amount, &settings.currency),
        record.date
    );
    Ok(())
}

/// Caller-side filtering over a full scan.
pub(crate) fn filter_records(
    records: Vec<Record>,
    record_type: Option<RecordType>,
    month: Option<(i32, u32)>,
) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| record_type.map_or(true, |t| r.record_type == t))
        .filter(|r| {
            month.map_or(true, |(y, m)| {
                parse_record_date(&r.date).is_some_and(|d| d.year() == y && d.month() == m)
            })
        })
        .collect()
}

pub fn list(settings: &Settings, record_type: Option<String>, month: Option<String>) -> Result<()> {
    require_login(&SessionFlag::default_location())?;
    let record_type = record_type.map(|t| t.parse::<RecordType>()).transpose()?;
    let month_filter = match parse_month_opt(&month) {
        (Some(y), Some(m)) => Some((y, m)),
        _ if month.is_some() => {
            return Err(TallyError::Validation("--month must be YYYY-MM".to_string()));
        }
        _ => None,
    };

    let storage = open_storage(settings)?;
    let rows = filter_records(storage.get_records()?, record_type, month_filter);

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Amount", "Note"]);
    for r in &rows {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.date),
            Cell::new(r.record_type),
            Cell::new(money(r.amount, &settings.currency)).set_alignment(CellAlignment::Right),
            Cell::new(r.note.clone().unwrap_or_default()),
        ]);
    }
    println!("Records ({})\n{table}", rows.len());
    Ok(())
}

pub fn edit(
    settings: &Settings,
    id: i64,
    date: Option<String>,
    record_type: Option<String>,
    amount: Option<f64>,
    note: Option<String>,
) -> Result<()> {
    require_login(&SessionFlag::default_location())?;
    let mut storage = open_storage(settings)?;

    let Some(mut record) = storage.get_records()?.into_iter().find(|r| r.id == id) else {
        println!("No record with ID {id} (0 changes)");
        return Ok(());
    };
    if let Some(d) = date {
        record.date = d.trim().to_string();
    }
    if let Some(t) = record_type {
        record.record_type = t.parse()?;
    }
    if let Some(a) = amount {
        record.amount = a;
    }
    if let Some(n) = note {
        record.note = blank_to_none(Some(n));
    }
    record.validate()?;

    let changes = storage.update_record(&record)?;
    println!("Updated record #{id} ({} changed)", changes.changes);
    Ok(())
}

pub fn delete(settings: &Settings, id: i64, yes: bool) -> Result<()> {
    require_login(&SessionFlag::default_location())?;
    let mut storage = open_storage(settings)?;

    if !yes {
        let Some(record) = storage.get_records()?.into_iter().find(|r| r.id == id) else {
            println!("No record with ID {id} (0 changes)");
            return Ok(());
        };
        let prompt = format!("Delete {} record #{id}?", record.record_type);
        if !confirm(&prompt, &mut std::io::stdin().lock())? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let changes = storage.delete_record(id)?;
    if changes.changes == 0 {
        println!("No record with ID {id} (0 changes)");
    } else {
        println!("Deleted record #{id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, date: &str, record_type: RecordType) -> Record {
        Record {
            id,
            date: date.to_string(),
            record_type,
            amount: 1.0,
            note: None,
        }
    }

    #[test]
    fn test_filter_by_type_and_month() {
        let rows = vec![
            rec(1, "2024-01-15", RecordType::Income),
            rec(2, "2024-01-20", RecordType::Expense),
            rec(3, "2024-02-01", RecordType::Expense),
            rec(4, "garbage", RecordType::Expense),
        ];
        let expenses = filter_records(rows.clone(), Some(RecordType::Expense), None);
        assert_eq!(expenses.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 4]);

        let january = filter_records(rows.clone(), None, Some((2024, 1)));
        assert_eq!(january.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

        let both = filter_records(rows, Some(RecordType::Expense), Some((2024, 1)));
        assert_eq!(both.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_blank_note_becomes_none() {
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(blank_to_none(Some("Rent".to_string())), Some("Rent".to_string()));
        assert_eq!(blank_to_none(None), None);
    }
}
