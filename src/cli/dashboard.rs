use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::aggregate::Dashboard;
use crate::cli::open_storage;
use crate::error::Result;
use crate::fmt::{bar, money, percent};
use crate::session::{require_login, SessionFlag};
use crate::settings::Settings;

const BAR_WIDTH: usize = 24;

pub fn run(settings: &Settings, json: bool) -> Result<()> {
    require_login(&SessionFlag::default_location())?;
    let storage = open_storage(settings)?;
    let records = storage.get_records()?;
    let dashboard = Dashboard::from_records(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("{}", format_dashboard(&dashboard, &settings.currency));
    }
    Ok(())
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn format_dashboard(dash: &Dashboard, currency: &str) -> String {
    [
        format_overview(dash, currency),
        format_distribution(dash, currency),
        format_trend(dash, currency),
    ]
    .join("\n\n")
}

fn format_overview(dash: &Dashboard, currency: &str) -> String {
    let t = &dash.totals;
    let mut table = Table::new();
    table.set_header(vec!["Financial Overview", "Amount"]);
    table.add_row(vec![Cell::new("Income".green()), right(money(t.income, currency))]);
    table.add_row(vec![Cell::new("Expense".red()), right(money(t.expense, currency))]);
    table.add_row(vec![Cell::new("Savings".bold()), right(money(t.savings, currency))]);
    table.add_row(vec![Cell::new("Savings %"), right(percent(t.savings_percentage))]);
    table.to_string()
}

fn format_distribution(dash: &Dashboard, currency: &str) -> String {
    let series = &dash.by_category;
    if series.values.is_empty() {
        return format!("{}\nNo expenses recorded.", "Expense Distribution".bold());
    }
    let total: f64 = series.values.iter().sum();
    let max = series.values.iter().copied().fold(0.0_f64, f64::max);

    let mut rows: Vec<(&String, f64)> = series.labels.iter().zip(series.values.iter().copied()).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "Share", ""]);
    for (name, amount) in rows {
        let share = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
        table.add_row(vec![
            Cell::new(name),
            right(money(amount, currency)),
            right(percent(share)),
            Cell::new(bar(amount, max, BAR_WIDTH).red()),
        ]);
    }
    format!("{}\n{table}", "Expense Distribution".bold())
}

fn format_trend(dash: &Dashboard, currency: &str) -> String {
    let months = &dash.by_month;
    if months.labels.is_empty() {
        return format!("{}\nNo dated records.", "Monthly Trend".bold());
    }
    let max = months
        .income
        .iter()
        .chain(months.expense.iter())
        .copied()
        .fold(0.0_f64, f64::max);

    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expense", "Net", ""]);
    for (i, label) in months.labels.iter().enumerate() {
        let income = months.income[i];
        let expense = months.expense[i];
        let bars = format!(
            "{}\n{}",
            bar(income, max, BAR_WIDTH).green(),
            bar(expense, max, BAR_WIDTH).red()
        );
        table.add_row(vec![
            Cell::new(label),
            right(money(income, currency)),
            right(money(expense, currency)),
            right(money(income - expense, currency)),
            Cell::new(bars),
        ]);
    }
    format!("{}\n{table}", "Monthly Income vs Expense".bold())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, RecordType};

    fn rec(id: i64, date: &str, record_type: RecordType, amount: f64, note: &str) -> Record {
        Record {
            id,
            date: date.to_string(),
            record_type,
            amount,
            note: Some(note.to_string()),
        }
    }

    #[test]
    fn test_format_dashboard_sections() {
        colored::control::set_override(false);
        let records = vec![
            rec(1, "2024-01-15", RecordType::Income, 50000.0, "Salary"),
            rec(2, "2024-01-16", RecordType::Expense, 5000.0, "Karachi Committee"),
            rec(3, "2024-02-17", RecordType::Expense, 3000.0, "Medicine"),
        ];
        let out = format_dashboard(&Dashboard::from_records(&records), "PKR");
        assert!(out.contains("PKR 50,000.00"));
        assert!(out.contains("PKR 42,000.00"));
        assert!(out.contains("84.0%"));
        assert!(out.contains("Karachi Committee"));
        assert!(out.contains("62.5%"));
        assert!(out.contains("Jan 2024"));
        assert!(out.contains("Feb 2024"));
    }

    #[test]
    fn test_format_dashboard_without_expenses() {
        colored::control::set_override(false);
        let out = format_dashboard(&Dashboard::from_records(&[]), "");
        assert!(out.contains("No expenses recorded."));
        assert!(out.contains("No dated records."));
        assert!(out.contains("0.0%"));
    }
}
