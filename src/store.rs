use std::path::Path;

use encoding_rs::Encoding;

use crate::dbf::{DbfReader, Record};
use crate::error::Result;
use crate::models::{PartyRecord, TransactionRecord, DOCKET_COLUMNS, PARTY_COLUMNS};

/// Records read from one table, plus the rows that had to be dropped.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub malformed: usize,
}

pub fn load_dockets(
    path: &Path,
    encoding: &'static Encoding,
    default_origin: &str,
) -> Result<Loaded<TransactionRecord>> {
    let mut reader = DbfReader::open(path, encoding)?;
    warn_missing_columns(&reader, path, DOCKET_COLUMNS);
    let records: Vec<TransactionRecord> = reader
        .by_ref()
        .map(|r| TransactionRecord::from_record(&r, default_origin))
        .collect();
    let stats = reader.finish()?;
    log::info!(
        "Loaded {} dockets from {} ({} malformed rows)",
        records.len(),
        path.display(),
        stats.malformed
    );
    Ok(Loaded {
        records,
        malformed: stats.malformed,
    })
}

pub fn load_parties(path: &Path, encoding: &'static Encoding) -> Result<Loaded<PartyRecord>> {
    let mut reader = DbfReader::open(path, encoding)?;
    warn_missing_columns(&reader, path, PARTY_COLUMNS);
    let records: Vec<PartyRecord> = reader.by_ref().map(|r| PartyRecord::from_record(&r)).collect();
    let stats = reader.finish()?;
    log::info!(
        "Loaded {} parties from {} ({} malformed rows)",
        records.len(),
        path.display(),
        stats.malformed
    );
    Ok(Loaded {
        records,
        malformed: stats.malformed,
    })
}

/// Parties fit for a picker: named, coded, sorted by name.
pub fn list_parties(parties: Vec<PartyRecord>) -> Vec<PartyRecord> {
    let mut listed: Vec<PartyRecord> = parties.into_iter().filter(PartyRecord::is_listed).collect();
    listed.sort_by(|a, b| a.name.cmp(&b.name));
    listed
}

const SAMPLE_ROWS: usize = 2;

/// What a table looks like, for connection checks.
#[derive(Debug, Clone)]
pub struct Probe {
    pub declared: u32,
    pub readable: usize,
    pub malformed: usize,
    pub fields: Vec<String>,
    pub encoding: &'static str,
    /// The first rows as `FIELD=value` pairs in table order, blanks left out.
    pub samples: Vec<String>,
}

pub fn probe(path: &Path, encoding: &'static Encoding) -> Result<Probe> {
    let mut reader = DbfReader::open(path, encoding)?;
    let fields = reader.fields().iter().map(|f| f.to_string()).collect();
    let declared = reader.declared_records();
    let encoding = reader.encoding().name();
    let names: Vec<String> = reader.fields().iter().map(|f| f.name.clone()).collect();
    let mut samples = Vec::new();
    let mut readable = 0;
    for record in reader.by_ref() {
        if samples.len() < SAMPLE_ROWS {
            samples.push(sample_line(&names, &record));
        }
        readable += 1;
    }
    let stats = reader.finish()?;
    Ok(Probe {
        declared,
        readable,
        malformed: stats.malformed,
        fields,
        encoding,
        samples,
    })
}

fn sample_line(names: &[String], record: &Record) -> String {
    names
        .iter()
        .filter(|name| !record.get(name).is_empty())
        .map(|name| format!("{name}={}", record.get(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn warn_missing_columns<R: std::io::Read>(reader: &DbfReader<R>, path: &Path, columns: &[&str]) {
    for column in columns {
        if !reader.has_field(column) {
            log::warn!("{} has no {column} column; values will be blank", path.display());
        }
    }
}
