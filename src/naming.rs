use chrono::NaiveDate;

pub const ALL_PARTIES: &str = "AllParties";

/// `Receipts_{token}_{YYYYMMDD}-{YYYYMMDD}.pdf` for a party name, or for
/// every party when `party_name` is `None`.
pub fn receipt_filename(party_name: Option<&str>, start: NaiveDate, end: NaiveDate) -> String {
    let token = match party_name {
        None => ALL_PARTIES.to_string(),
        Some(name) => filesystem_token(name),
    };
    format!(
        "Receipts_{token}_{}-{}.pdf",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}

/// Replace everything outside `[A-Za-z0-9_]` with `_`.
pub fn filesystem_token(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
