use chrono::NaiveDate;

/// Group the integer part with commas: 1234567.5 -> "1,234,567.50".
fn with_commas(val: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, val.abs());
    // Values that round to zero print unsigned.
    let negative = val < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let (int_part, dec_part) = match fixed.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    match dec_part {
        Some(d) => format!("{sign}{grouped}.{d}"),
        None => format!("{sign}{grouped}"),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Amount for display; text that is not a number is passed through.
pub fn amount(raw: &str) -> String {
    match parse_number(raw) {
        Some(v) => with_commas(v, 2),
        None => raw.trim().to_string(),
    }
}

/// Weight in kilograms for display; text that is not a number is passed through.
pub fn weight(raw: &str) -> String {
    match parse_number(raw) {
        Some(v) => format!("{} kg", with_commas(v, 3)),
        None => raw.trim().to_string(),
    }
}

pub fn slip_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
