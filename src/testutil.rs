//! Test-only helpers for building dBASE tables and fixtures.

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::NaiveDate;

use crate::models::{PartyRecord, TransactionRecord};

pub struct DbfBuilder {
    fields: Vec<(String, char, u16)>,
    rows: Vec<(bool, Vec<String>)>,
}

impl DbfBuilder {
    pub fn new(fields: &[(&str, char, u8)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, kind, len)| (name.to_string(), *kind, u16::from(*len)))
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Add a field; character fields over 255 bytes use the Clipper layout.
    pub fn field(mut self, name: &str, kind: char, len: u16) -> Self {
        self.fields.push((name.to_string(), kind, len));
        self
    }

    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows
            .push((false, values.iter().map(|v| v.to_string()).collect()));
        self
    }

    pub fn deleted_row(mut self, values: &[&str]) -> Self {
        self.rows
            .push((true, values.iter().map(|v| v.to_string()).collect()));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header_len = 32 + 32 * self.fields.len() + 1;
        let record_len = 1 + self.fields.iter().map(|f| f.2 as usize).sum::<usize>();

        let mut out = Vec::new();
        out.push(0x03);
        out.extend_from_slice(&[124, 12, 1]);
        out.write_u32::<LittleEndian>(self.rows.len() as u32).unwrap();
        out.write_u16::<LittleEndian>(header_len as u16).unwrap();
        out.write_u16::<LittleEndian>(record_len as u16).unwrap();
        out.extend_from_slice(&[0u8; 20]);

        for (name, kind, len) in &self.fields {
            let mut raw_name = [0u8; 11];
            raw_name[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&raw_name);
            out.push(*kind as u8);
            out.extend_from_slice(&[0u8; 4]);
            out.write_u16::<LittleEndian>(*len).unwrap();
            out.extend_from_slice(&[0u8; 14]);
        }
        out.push(0x0D);

        for (deleted, values) in &self.rows {
            out.push(if *deleted { b'*' } else { b' ' });
            for (i, (_, kind, len)) in self.fields.iter().enumerate() {
                let len = *len as usize;
                let value = values.get(i).map(String::as_str).unwrap_or("");
                let value: String = value.chars().take(len).collect();
                let cell = if *kind == 'N' {
                    format!("{value:>len$}")
                } else {
                    format!("{value:<len$}")
                };
                out.extend_from_slice(cell.as_bytes());
            }
        }
        out.push(0x1A);
        out
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }
}

pub const DOCKET_FIELDS: &[(&str, char, u8)] = &[
    ("DOC_NO", 'C', 10),
    ("DATE", 'D', 8),
    ("PRTCD", 'C', 6),
    ("PARTY", 'C', 30),
    ("CITY", 'C', 20),
    ("REMARK", 'C', 20),
    ("WEIGHT", 'N', 8),
    ("AMOUNT", 'N', 10),
];

pub const PARTY_FIELDS: &[(&str, char, u8)] = &[
    ("PRTCD", 'C', 6),
    ("PRTNM", 'C', 30),
    ("CITY", 'C', 20),
    ("PHONE_1", 'C', 15),
    ("MOBILE", 'C', 15),
    ("ADR1", 'C', 30),
    ("ADR2", 'C', 30),
    ("ADR3", 'C', 30),
];

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn docket(docket_no: &str, day: &str, party_code: &str) -> TransactionRecord {
    TransactionRecord {
        docket_no: docket_no.to_string(),
        date: NaiveDate::parse_from_str(day, "%Y-%m-%d").ok(),
        raw_date: day.to_string(),
        party_code: party_code.to_string(),
        party_name: String::new(),
        origin: "BAVLA".to_string(),
        destination: "SURAT".to_string(),
        ref_no: String::new(),
        weight: "1.5".to_string(),
        amount: "120".to_string(),
    }
}

pub fn party(code: &str, name: &str) -> PartyRecord {
    PartyRecord {
        code: code.to_string(),
        name: name.to_string(),
        city: "AHMEDABAD".to_string(),
        phone: "079-2345678".to_string(),
        ..Default::default()
    }
}
