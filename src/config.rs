use std::path::PathBuf;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Consignor printed in the "FROM" block of every slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Default for Sender {
    fn default() -> Self {
        Self {
            name: "PHC - PRIMARY HEALTH CENTER - BAVLA".to_string(),
            lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlipConfig {
    pub per_page: usize,
    pub columns: usize,
    /// Courier letterhead shown at the top of each slip.
    pub header: Vec<String>,
    pub sender: Sender,
    pub logo: Option<PathBuf>,
}

impl SlipConfig {
    pub fn rows(&self) -> usize {
        self.per_page.div_ceil(self.columns)
    }
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            per_page: 4,
            columns: 2,
            header: Vec::new(),
            sender: Sender::default(),
            logo: None,
        }
    }
}

/// Everything one generation run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub dockets_path: PathBuf,
    pub parties_path: PathBuf,
    pub encoding: &'static Encoding,
    pub default_origin: String,
    pub slip: SlipConfig,
}
