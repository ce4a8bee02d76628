use std::path::Path;

use assert_cmd::Command;

/// Minimal dBASE III writer: character fields only, every row live.
pub fn write_dbf(path: &Path, fields: &[(&str, u8)], rows: &[&[&str]]) {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + fields.iter().map(|f| f.1 as usize).sum::<usize>();

    let mut out = vec![0x03, 124, 12, 1];
    out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(&(record_len as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);
    for (name, len) in fields {
        let mut raw = [0u8; 32];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        raw[11] = b'C';
        raw[16] = *len;
        out.extend_from_slice(&raw);
    }
    out.push(0x0D);
    for row in rows {
        out.push(b' ');
        for (i, (_, len)) in fields.iter().enumerate() {
            let len = *len as usize;
            let value = row.get(i).copied().unwrap_or("");
            out.extend_from_slice(format!("{value:<len$.len$}").as_bytes());
        }
    }
    out.push(0x1A);
    std::fs::write(path, out).unwrap();
}

const DOCKETS: &[(&str, u8)] = &[
    ("DOC_NO", 10),
    ("DATE", 8),
    ("PRTCD", 6),
    ("PARTY", 30),
    ("CITY", 20),
    ("REMARK", 20),
    ("WEIGHT", 8),
    ("AMOUNT", 10),
];

const PARTIES: &[(&str, u8)] = &[
    ("PRTCD", 6),
    ("PRTNM", 30),
    ("CITY", 20),
    ("PHONE_1", 15),
    ("MOBILE", 15),
    ("ADR1", 30),
];

pub fn seed(dir: &Path) {
    write_dbf(
        &dir.join("DLCHLN.DBF"),
        DOCKETS,
        &[
            &["1002", "20241205", "P02", "", "RAJKOT", "", "3", "200"],
            &["1001", "20241201", "P01", "", "SURAT", "R1", "1.5", "120"],
            &["1003", "20241220", "P01", "", "VAPI", "", "", ""],
            &["0900", "20241101", "P01", "", "SURAT", "", "", ""],
        ],
    );
    write_dbf(
        &dir.join("PRTMST.DBF"),
        PARTIES,
        &[
            &["P01", "ABC Company", "AHMEDABAD", "079-111", "", "Plot 4"],
            &["P02", "Mehta Traders", "RAJKOT", "", "98250", ""],
            &["P03", "", "BAVLA", "", "", ""],
        ],
    );
}

/// `slipgen` running inside `dir` with a private home and no path overrides.
pub fn slipgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("slipgen").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir.join("home"))
        .env_remove("DLCHLN_PATH")
        .env_remove("PRTMST_PATH")
        .env_remove("SLIPGEN_LOGO")
        .env_remove("RUST_LOG");
    cmd
}
