//! Currency formatting for tables, labels and reports.

/// Whole-dollar amount with thousands separators, e.g. `$1,234,568`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

/// Compact axis label: `$1.5M`, `$250k`, `$900`.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.0}k", value / 1_000.0)
    } else {
        format!("${value}")
    }
}

/// Probability as a percentage with one decimal, e.g. `99.3%`.
pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}
