/// Format an amount with thousands separators and an optional currency
/// prefix: `PKR 1,234.56`.
pub fn money(val: f64, currency: &str) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    if currency.is_empty() {
        format!("{sign}{with_commas}.{dec_part}")
    } else {
        format!("{sign}{currency} {with_commas}.{dec_part}")
    }
}

pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

/// A fixed-width bar for terminal charts, scaled against `max`.
pub fn bar(val: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || val <= 0.0 {
        return String::new();
    }
    let filled = ((val / max) * width as f64).round() as usize;
    "\u{2588}".repeat(filled.clamp(1, width))
}
