//! Minimal dBASE (`.DBF`) table reader.
//!
//! Only the parts of the format needed to pull text out of legacy tables are
//! understood: the fixed header, field descriptors and fixed-width records.
//! Memo and binary fields are surfaced as blank values.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;

use crate::error::{Result, SlipError};

const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const FIELD_TERMINATOR: u8 = 0x0D;
const EOF_MARKER: u8 = 0x1A;

// dBASE II-V, FoxBASE, FoxPro and Visual FoxPro signatures.
const KNOWN_VERSIONS: &[u8] = &[
    0x02, 0x03, 0x05, 0x30, 0x31, 0x32, 0x43, 0x63, 0x83, 0x8B, 0x8E, 0xCB, 0xF5, 0xFB,
];
// dBASE 7 uses a 68-byte header and 48-byte descriptors.
const DBASE7: u8 = 0x04;

/// Resolve a WHATWG encoding label such as `windows-1252` or `latin1`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SlipError::Settings(format!("unknown text encoding '{label}'")))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: char,
    pub length: usize,
    pub decimals: u8,
}

impl std::fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.decimals > 0 {
            write!(f, "{} {}({},{})", self.name, self.field_type, self.length, self.decimals)
        } else {
            write!(f, "{} {}({})", self.name, self.field_type, self.length)
        }
    }
}

impl FieldDescriptor {
    fn is_textual(&self) -> bool {
        !matches!(self.field_type, 'M' | 'G' | 'B' | 'P')
    }
}

/// One table row as field name -> trimmed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    /// Value of `name`, or an empty string when the table has no such field.
    pub fn get(&self, name: &str) -> &str {
        self.values
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into().to_ascii_uppercase(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadStats {
    pub malformed: usize,
}

/// Lazy record iterator over a dBASE table.
///
/// Deleted rows are skipped. Rows with an unknown deletion flag or a short
/// payload are skipped and counted; call [`DbfReader::finish`] after
/// iterating to collect the count or any I/O failure hit mid-stream.
pub struct DbfReader<R> {
    path: PathBuf,
    reader: R,
    encoding: &'static Encoding,
    fields: Vec<FieldDescriptor>,
    declared: u32,
    position: u32,
    buf: Vec<u8>,
    malformed: usize,
    failure: Option<std::io::Error>,
    done: bool,
}

impl DbfReader<BufReader<File>> {
    pub fn open(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let file = File::open(path).map_err(|e| SlipError::data_source(path, e))?;
        Self::from_reader(path, BufReader::new(file), encoding)
    }
}

impl<R: Read> DbfReader<R> {
    pub fn from_reader(path: &Path, mut reader: R, encoding: &'static Encoding) -> Result<Self> {
        let corrupt = |reason: String| SlipError::data_source(path, reason);

        let mut header = [0u8; HEADER_LEN];
        reader
            .read_exact(&mut header)
            .map_err(|e| corrupt(format!("truncated header ({e})")))?;

        let version = header[0];
        if version == DBASE7 {
            return Err(corrupt("dBASE 7 tables are not supported".to_string()));
        }
        if !KNOWN_VERSIONS.contains(&version) {
            return Err(corrupt(format!(
                "not a dBASE table (signature byte 0x{version:02X})"
            )));
        }

        let mut counts = &header[4..12];
        let declared = counts.read_u32::<LittleEndian>()?;
        let header_len = counts.read_u16::<LittleEndian>()? as usize;
        let record_len = counts.read_u16::<LittleEndian>()? as usize;

        if header_len <= HEADER_LEN {
            return Err(corrupt(format!("header length {header_len} too small")));
        }

        let mut descriptors = vec![0u8; header_len - HEADER_LEN];
        reader
            .read_exact(&mut descriptors)
            .map_err(|e| corrupt(format!("truncated field descriptors ({e})")))?;
        let mut fields = parse_descriptors(&descriptors).map_err(corrupt)?;
        if payload_len(&fields) != record_len {
            widen_character_fields(&mut fields, record_len);
        }

        let payload = payload_len(&fields);
        if payload > record_len {
            return Err(corrupt(format!(
                "record length {record_len} is shorter than its fields ({payload})"
            )));
        }

        log::debug!(
            "{}: version 0x{version:02X}, {declared} records, {} fields",
            path.display(),
            fields.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            encoding,
            fields,
            declared,
            position: 0,
            buf: vec![0u8; record_len],
            malformed: 0,
            failure: None,
            done: false,
        })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Record count stored in the header.
    pub fn declared_records(&self) -> u32 {
        self.declared
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn finish(self) -> Result<ReadStats> {
        match self.failure {
            Some(e) => Err(SlipError::data_source(&self.path, e)),
            None => Ok(ReadStats {
                malformed: self.malformed,
            }),
        }
    }

    fn decode(&self) -> Record {
        let mut values = HashMap::with_capacity(self.fields.len());
        let mut offset = 1;
        for field in &self.fields {
            let raw = &self.buf[offset..offset + field.length];
            offset += field.length;
            let value = if field.is_textual() {
                let (text, _) = self.encoding.decode_without_bom_handling(raw);
                text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string()
            } else {
                String::new()
            };
            values.insert(field.name.clone(), value);
        }
        Record { values }
    }
}

impl<R: Read> Iterator for DbfReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        while !self.done && self.position < self.declared {
            self.position += 1;
            match read_full(&mut self.reader, &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                }
                Ok(n) if n < self.buf.len() => {
                    if !(n == 1 && self.buf[0] == EOF_MARKER) {
                        self.malformed += 1;
                        log::warn!(
                            "{}: record {} truncated ({n} of {} bytes)",
                            self.path.display(),
                            self.position,
                            self.buf.len()
                        );
                    }
                    self.done = true;
                }
                Ok(_) => match self.buf[0] {
                    b' ' => return Some(self.decode()),
                    b'*' => {}
                    EOF_MARKER => self.done = true,
                    flag => {
                        self.malformed += 1;
                        log::warn!(
                            "{}: record {} has invalid deletion flag 0x{flag:02X}, skipped",
                            self.path.display(),
                            self.position
                        );
                    }
                },
                Err(e) => {
                    self.failure = Some(e);
                    self.done = true;
                }
            }
        }
        None
    }
}

fn parse_descriptors(bytes: &[u8]) -> std::result::Result<Vec<FieldDescriptor>, String> {
    let mut fields = Vec::new();
    let mut offset = 0;
    loop {
        match bytes.get(offset) {
            None => return Err("missing field descriptor terminator".to_string()),
            Some(&FIELD_TERMINATOR) => break,
            Some(_) => {}
        }
        let chunk = bytes
            .get(offset..offset + DESCRIPTOR_LEN)
            .ok_or_else(|| "truncated field descriptor".to_string())?;
        let name_end = chunk[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&chunk[..name_end])
            .trim()
            .to_ascii_uppercase();
        if name.is_empty() {
            return Err(format!("field descriptor {} has no name", fields.len() + 1));
        }
        fields.push(FieldDescriptor {
            name,
            field_type: chunk[11] as char,
            length: chunk[16] as usize,
            decimals: chunk[17],
        });
        offset += DESCRIPTOR_LEN;
    }
    if fields.is_empty() {
        return Err("table declares no fields".to_string());
    }
    Ok(fields)
}

fn payload_len(fields: &[FieldDescriptor]) -> usize {
    1 + fields.iter().map(|f| f.length).sum::<usize>()
}

/// Clipper and FoxPro keep character fields wider than 255 bytes as a 16-bit
/// length spread over the length and decimal-count bytes. Switch to that
/// reading only when it accounts for the declared record length exactly.
fn widen_character_fields(fields: &mut [FieldDescriptor], record_len: usize) {
    let widened: Vec<FieldDescriptor> = fields
        .iter()
        .map(|f| match f.field_type {
            'C' if f.decimals > 0 => FieldDescriptor {
                length: f.length + 256 * f.decimals as usize,
                decimals: 0,
                ..f.clone()
            },
            _ => f.clone(),
        })
        .collect();
    if payload_len(&widened) == record_len {
        log::debug!("reading wide character fields as 16-bit lengths");
        fields.clone_from_slice(&widened);
    }
}

/// Fill `buf` as far as the stream allows; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
