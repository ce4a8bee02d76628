use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{Config, Sender, SlipConfig};
use crate::dbf::encoding_for_label;
use crate::error::{Result, SlipError};

/// Persisted user settings; every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_dockets_path")]
    pub dockets_path: String,
    #[serde(default = "default_parties_path")]
    pub parties_path: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_origin")]
    pub default_origin: String,
    #[serde(default)]
    pub sender: Sender,
    #[serde(default = "default_header")]
    pub header: Vec<String>,
    #[serde(default = "default_receipts_per_page")]
    pub receipts_per_page: usize,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_dockets_path() -> String {
    "DLCHLN.DBF".to_string()
}

fn default_parties_path() -> String {
    "PRTMST.DBF".to_string()
}

fn default_encoding() -> String {
    "windows-1252".to_string()
}

fn default_origin() -> String {
    "BAVLA".to_string()
}

fn default_header() -> Vec<String> {
    vec![
        "Shree Balaji Courier Services".to_string(),
        "15, Madhav Complex, Nr. Bavla Sanand Chokdi".to_string(),
        "Bavla - 382220".to_string(),
    ]
}

fn default_receipts_per_page() -> usize {
    4
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dockets_path: default_dockets_path(),
            parties_path: default_parties_path(),
            encoding: default_encoding(),
            default_origin: default_origin(),
            sender: Sender::default(),
            header: default_header(),
            receipts_per_page: default_receipts_per_page(),
            logo_path: None,
            output_dir: default_output_dir(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("slipgen")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable settings {}: {e}", path.display());
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SlipError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

impl Settings {
    /// Apply `DLCHLN_PATH`, `PRTMST_PATH` and `SLIPGEN_LOGO` overrides.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = present("DLCHLN_PATH") {
            self.dockets_path = v;
        }
        if let Some(v) = present("PRTMST_PATH") {
            self.parties_path = v;
        }
        if let Some(v) = present("SLIPGEN_LOGO") {
            self.logo_path = Some(v);
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.output_dir))
    }

    /// Validate and resolve into the configuration the pipeline runs on.
    pub fn to_config(&self) -> Result<Config> {
        if self.receipts_per_page == 0 {
            return Err(SlipError::Settings(
                "receipts_per_page must be at least 1".to_string(),
            ));
        }
        let encoding = encoding_for_label(&self.encoding)?;
        Ok(Config {
            dockets_path: PathBuf::from(shellexpand_path(&self.dockets_path)),
            parties_path: PathBuf::from(shellexpand_path(&self.parties_path)),
            encoding,
            default_origin: self.default_origin.clone(),
            slip: SlipConfig {
                per_page: self.receipts_per_page,
                columns: self.receipts_per_page.min(2),
                header: self.header.clone(),
                sender: self.sender.clone(),
                logo: self
                    .logo_path
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .map(|p| PathBuf::from(shellexpand_path(p))),
            },
        })
    }
}
