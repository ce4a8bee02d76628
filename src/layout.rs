//! Pagination of slips into a fixed grid, independent of the PDF backend.

use crate::config::SlipConfig;
use crate::fmt;
use crate::selection::Slip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

/// Row-major position of the `index`th slip on a page.
pub fn grid_cell(index: usize, columns: usize) -> GridCell {
    GridCell {
        row: index / columns,
        column: index % columns,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receiver {
    pub name: String,
    pub address: Vec<String>,
    pub city: String,
    pub contact: String,
}

/// Display strings for one slip. Every field is present; missing data is blank.
#[derive(Debug, Clone, PartialEq)]
pub struct SlipBlock {
    pub docket_no: String,
    pub date: String,
    pub origin: String,
    pub destination: String,
    pub reference: String,
    pub weight: String,
    pub amount: String,
    pub receiver: Receiver,
}

impl SlipBlock {
    pub fn from_slip(slip: &Slip) -> Self {
        let docket = &slip.docket;
        let party = &slip.party;
        let name = if party.name.is_empty() {
            docket.party_name.clone()
        } else {
            party.name.clone()
        };
        Self {
            docket_no: docket.docket_no.clone(),
            date: docket
                .date
                .map(fmt::slip_date)
                .unwrap_or_else(|| docket.raw_date.clone()),
            origin: docket.origin.clone(),
            destination: docket.destination.clone(),
            reference: docket.ref_no.clone(),
            weight: fmt::weight(&docket.weight),
            amount: fmt::amount(&docket.amount),
            receiver: Receiver {
                name,
                address: party.address_lines().map(str::to_string).collect(),
                city: party.city.clone(),
                contact: party.contact(),
            },
        }
    }

    /// Label/value pairs of the tracking table, in print order.
    pub fn tracking_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("Docket No", self.docket_no.as_str()),
            ("Date", self.date.as_str()),
            ("Origin", self.origin.as_str()),
            ("Destination", self.destination.as_str()),
            ("Ref No", self.reference.as_str()),
            ("Weight", self.weight.as_str()),
            ("Amount", self.amount.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlipPage {
    pub number: usize,
    /// One entry per grid cell in row-major order; `None` cells print blank.
    pub cells: Vec<Option<SlipBlock>>,
}

impl SlipPage {
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Split `slips` into pages of `config.per_page`, preserving order.
pub fn paginate(slips: &[Slip], config: &SlipConfig) -> Vec<SlipPage> {
    let per_page = config.per_page.max(1);
    slips
        .chunks(per_page)
        .enumerate()
        .map(|(i, group)| {
            let mut cells: Vec<Option<SlipBlock>> =
                group.iter().map(|s| Some(SlipBlock::from_slip(s))).collect();
            cells.resize(per_page, None);
            SlipPage {
                number: i + 1,
                cells,
            }
        })
        .collect()
}
