use chrono::NaiveDate;

use crate::dbf::Record;

// Docket table (DLCHLN.DBF) columns.
pub const DOCKET_NO: &str = "DOC_NO";
pub const DOCKET_DATE: &str = "DATE";
pub const DOCKET_PARTY_CODE: &str = "PRTCD";
pub const DOCKET_PARTY_NAME: &str = "PARTY";
pub const DOCKET_ORIGIN: &str = "ORIGIN";
pub const DOCKET_DESTINATION: &str = "CITY";
pub const DOCKET_REF_NO: &str = "REMARK";
pub const DOCKET_WEIGHT: &str = "WEIGHT";
pub const DOCKET_AMOUNT: &str = "AMOUNT";

// Party master (PRTMST.DBF) columns.
pub const PARTY_CODE: &str = "PRTCD";
pub const PARTY_NAME: &str = "PRTNM";
pub const PARTY_CITY: &str = "CITY";
pub const PARTY_PHONE: &str = "PHONE_1";
pub const PARTY_MOBILE: &str = "MOBILE";
pub const PARTY_ADDRESS: [&str; 3] = ["ADR1", "ADR2", "ADR3"];

/// Columns a docket table is expected to carry; `ORIGIN` is optional.
pub const DOCKET_COLUMNS: &[&str] = &[
    DOCKET_NO,
    DOCKET_DATE,
    DOCKET_PARTY_CODE,
    DOCKET_DESTINATION,
    DOCKET_REF_NO,
    DOCKET_WEIGHT,
    DOCKET_AMOUNT,
];

pub const PARTY_COLUMNS: &[&str] = &[PARTY_CODE, PARTY_NAME, PARTY_CITY];

/// A single courier docket.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub docket_no: String,
    /// `None` when the stored date could not be parsed.
    pub date: Option<NaiveDate>,
    pub raw_date: String,
    pub party_code: String,
    /// Party name typed on the docket itself.
    pub party_name: String,
    pub origin: String,
    pub destination: String,
    pub ref_no: String,
    pub weight: String,
    pub amount: String,
}

impl TransactionRecord {
    pub fn from_record(record: &Record, default_origin: &str) -> Self {
        let raw_date = record.get(DOCKET_DATE).to_string();
        let origin = match record.get(DOCKET_ORIGIN) {
            "" => default_origin.to_string(),
            o => o.to_string(),
        };
        Self {
            docket_no: record.get(DOCKET_NO).to_string(),
            date: parse_record_date(&raw_date),
            raw_date,
            party_code: record.get(DOCKET_PARTY_CODE).to_string(),
            party_name: record.get(DOCKET_PARTY_NAME).to_string(),
            origin,
            destination: record.get(DOCKET_DESTINATION).to_string(),
            ref_no: record.get(DOCKET_REF_NO).to_string(),
            weight: record.get(DOCKET_WEIGHT).to_string(),
            amount: record.get(DOCKET_AMOUNT).to_string(),
        }
    }
}

/// A sender/receiver from the party master.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartyRecord {
    pub code: String,
    pub name: String,
    pub city: String,
    pub phone: String,
    pub mobile: String,
    pub address: [String; 3],
}

impl PartyRecord {
    pub fn from_record(record: &Record) -> Self {
        Self {
            code: record.get(PARTY_CODE).to_string(),
            name: record.get(PARTY_NAME).to_string(),
            city: record.get(PARTY_CITY).to_string(),
            phone: record.get(PARTY_PHONE).to_string(),
            mobile: record.get(PARTY_MOBILE).to_string(),
            address: PARTY_ADDRESS.map(|f| record.get(f).to_string()),
        }
    }

    /// Whether the party belongs in "available parties" listings.
    pub fn is_listed(&self) -> bool {
        !self.code.is_empty() && !self.name.is_empty()
    }

    pub fn address_lines(&self) -> impl Iterator<Item = &str> {
        self.address.iter().map(String::as_str).filter(|l| !l.is_empty())
    }

    /// Phone and mobile joined for display, blanks omitted.
    pub fn contact(&self) -> String {
        [self.phone.as_str(), self.mobile.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Parse a stored docket date. Native dBASE dates are `YYYYMMDD`; tables
/// migrated from other tools sometimes carry text dates instead.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    ["%Y%m%d", "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
