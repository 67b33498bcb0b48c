/// Round to two decimals, normalizing negative zero
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Integer with thousands separators: 1234567 -> "1,234,567"
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Sign-aware percent change: "+0.12%", "-0.30%", "0.00%"
pub fn format_signed_percentage(change: f64) -> String {
    let change = round2(change);
    if change > 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// Sign-aware integer change with separators, "-" when unchanged
pub fn format_signed_number(change: i64) -> String {
    match change {
        0 => "-".to_string(),
        c if c > 0 => format!("+{}", format_number(c)),
        c => format_number(c),
    }
}
