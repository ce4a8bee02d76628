//! Request-scoped generation: read both tables, select, lay out, render, name.
//!
//! Every call opens its own handles to the source tables, so callers never
//! share state and always see the files as they are on disk right now.

use crate::config::Config;
use crate::error::Result;
use crate::layout::paginate;
use crate::models::PartyRecord;
use crate::naming::receipt_filename;
use crate::pdf::render_slips;
use crate::selection::{select, DateRange, PartySelector, Slip};
use crate::store::{load_dockets, load_parties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub range: DateRange,
    pub selector: PartySelector,
}

/// Non-fatal problems met while reading and filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Warnings {
    pub malformed_rows: usize,
    pub invalid_dates: usize,
}

impl Warnings {
    pub fn is_clean(&self) -> bool {
        self.malformed_rows == 0 && self.invalid_dates == 0
    }
}

#[derive(Debug, Clone)]
pub struct Preview {
    pub slips: Vec<Slip>,
    pub filename: String,
    pub warnings: Warnings,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub slips: usize,
    pub pages: usize,
    pub warnings: Warnings,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// Nothing matched the selection.
    Empty { warnings: Warnings },
    Document(Document),
}

/// Name that goes into the output file for `selector`. A code with no named
/// party record falls back to the code itself.
fn selector_display_name(selector: &PartySelector, parties: &[PartyRecord]) -> Option<String> {
    let code = selector.code()?;
    let name = parties
        .iter()
        .find(|p| p.code == code && !p.name.is_empty())
        .map(|p| p.name.clone())
        .unwrap_or_else(|| code.to_string());
    Some(name)
}

/// Everything short of rendering: the ordered slips and the file name.
pub fn preview(config: &Config, request: &Request) -> Result<Preview> {
    let dockets = load_dockets(&config.dockets_path, config.encoding, &config.default_origin)?;
    let parties = load_parties(&config.parties_path, config.encoding)?;

    let selection = select(
        dockets.records,
        &parties.records,
        &request.range,
        &request.selector,
    );
    let name = selector_display_name(&request.selector, &parties.records);
    let filename = receipt_filename(name.as_deref(), request.range.start(), request.range.end());

    Ok(Preview {
        slips: selection.slips,
        filename,
        warnings: Warnings {
            malformed_rows: dockets.malformed + parties.malformed,
            invalid_dates: selection.invalid_dates,
        },
    })
}

pub fn generate(config: &Config, request: &Request) -> Result<Outcome> {
    let preview = preview(config, request)?;
    if preview.slips.is_empty() {
        log::info!("No dockets for {}", preview.filename);
        return Ok(Outcome::Empty {
            warnings: preview.warnings,
        });
    }
    render(config, preview)
}

/// Render a preview the caller has already inspected.
pub fn render(config: &Config, preview: Preview) -> Result<Outcome> {
    if preview.slips.is_empty() {
        return Ok(Outcome::Empty {
            warnings: preview.warnings,
        });
    }
    let pages = paginate(&preview.slips, &config.slip);
    let bytes = render_slips(&pages, &config.slip)?;
    Ok(Outcome::Document(Document {
        bytes,
        filename: preview.filename,
        slips: preview.slips.len(),
        pages: pages.len(),
        warnings: preview.warnings,
    }))
}
