// File: crates/ticker-core/src/format.rs
// Summary: Number, currency and percentage formatting for card and axis text.

/// Format with a fixed number of decimals and `,` thousands separators.
pub fn format_number(v: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let negative = v < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `$1,234.56`; sub-dollar values keep four significant digits (`$0.001234`).
pub fn format_currency(v: f64) -> String {
    if !v.is_finite() {
        return "$-".to_string();
    }
    let abs = v.abs();
    let body = if abs >= 1.0 || abs == 0.0 {
        format_number(abs, 2)
    } else {
        let decimals = ((-abs.log10().floor()) as usize + 3).min(10);
        let s = format_number(abs, decimals);
        let trimmed = s.trim_end_matches('0');
        // Keep at least two decimals.
        let dot = trimmed.find('.').unwrap_or(trimmed.len());
        let keep = trimmed.len().max(dot + 3).min(s.len());
        s[..keep].to_string()
    };
    if v < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// `-3.20%`
pub fn format_percent(v: f64) -> String {
    if !v.is_finite() {
        return "-%".to_string();
    }
    let s = format!("{v:.2}%");
    if s == "-0.00%" { "0.00%".to_string() } else { s }
}

/// Axis tick text with as many decimals as the tick step needs.
pub fn format_tick(v: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).clamp(0.0, 8.0) as usize
    } else {
        0
    };
    format_number(v, decimals)
}
