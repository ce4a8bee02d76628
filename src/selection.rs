use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{Result, SlipError};
use crate::models::{PartyRecord, TransactionRecord};

/// Inclusive date window; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SlipError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartySelector {
    All,
    Code(String),
}

impl PartySelector {
    /// A missing or blank code means every party.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            None | Some("") => PartySelector::All,
            Some(c) => PartySelector::Code(c.to_string()),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            PartySelector::All => None,
            PartySelector::Code(c) => Some(c.as_str()),
        }
    }

    fn matches(&self, party_code: &str) -> bool {
        match self {
            PartySelector::All => true,
            PartySelector::Code(c) => party_code.trim() == c.as_str(),
        }
    }
}

/// A docket paired with its receiver; `party` is blank when unmatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Slip {
    pub docket: TransactionRecord,
    pub party: PartyRecord,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub slips: Vec<Slip>,
    /// Dockets for the selected party dropped because their date is unreadable.
    pub invalid_dates: usize,
}

/// Filter dockets to `range` and `selector`, left-join them to parties and
/// order by docket number.
pub fn select(
    dockets: Vec<TransactionRecord>,
    parties: &[PartyRecord],
    range: &DateRange,
    selector: &PartySelector,
) -> Selection {
    let mut by_code: HashMap<&str, &PartyRecord> = HashMap::new();
    for party in parties.iter().filter(|p| !p.code.is_empty()) {
        by_code.entry(party.code.as_str()).or_insert(party);
    }

    let mut invalid_dates = 0;
    let mut slips = Vec::new();
    for docket in dockets {
        if !selector.matches(&docket.party_code) {
            continue;
        }
        let Some(date) = docket.date else {
            log::warn!(
                "Docket '{}' has unreadable date '{}', skipped",
                docket.docket_no,
                docket.raw_date
            );
            invalid_dates += 1;
            continue;
        };
        if !range.contains(date) {
            continue;
        }
        let party = by_code
            .get(docket.party_code.trim())
            .map(|p| (*p).clone())
            .unwrap_or_default();
        slips.push(Slip { docket, party });
    }

    // Stable: equal docket numbers keep read order.
    slips.sort_by(|a, b| cmp_docket_no(&a.docket.docket_no, &b.docket.docket_no));

    log::info!(
        "Selected {} dockets between {} and {} ({} with invalid dates)",
        slips.len(),
        range.start,
        range.end,
        invalid_dates
    );
    Selection {
        slips,
        invalid_dates,
    }
}

/// Numeric docket numbers sort numerically and ahead of anything else;
/// the rest sort as text.
pub fn cmp_docket_no(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{date, docket, party};

    fn december() -> DateRange {
        DateRange::new(date("2024-12-01"), date("2024-12-31")).unwrap()
    }

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let err = DateRange::new(date("2024-12-31"), date("2024-12-01")).unwrap_err();
        assert!(matches!(err, SlipError::InvalidDateRange { .. }));
        assert!(DateRange::new(date("2024-12-01"), date("2024-12-01")).is_ok());
    }

    #[test]
    fn test_filters_to_inclusive_range() {
        let dockets = vec![
            docket("1", "2024-11-30", "P01"),
            docket("2", "2024-12-01", "P01"),
            docket("3", "2024-12-31", "P01"),
            docket("4", "2025-01-01", "P01"),
        ];
        let range = december();
        let sel = select(dockets, &[], &range, &PartySelector::All);
        let ids: Vec<&str> = sel.slips.iter().map(|s| s.docket.docket_no.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        for s in &sel.slips {
            assert!(range.contains(s.docket.date.unwrap()));
        }
    }

    #[test]
    fn test_invalid_dates_are_counted_not_fatal() {
        let mut bad = docket("9", "garbage", "P01");
        bad.date = None;
        let dockets = vec![bad, docket("1", "2024-12-05", "P01")];
        let sel = select(dockets, &[], &december(), &PartySelector::All);
        assert_eq!(sel.slips.len(), 1);
        assert_eq!(sel.invalid_dates, 1);
    }

    #[test]
    fn test_party_selector_filters_by_code() {
        let dockets = vec![
            docket("1", "2024-12-05", "P01"),
            docket("2", "2024-12-06", "P02"),
            docket("3", "2024-12-07", " P01 "),
        ];
        let parties = vec![party("P01", "ABC Company"), party("P02", "Zenith Labs")];
        let sel = select(
            dockets,
            &parties,
            &december(),
            &PartySelector::Code("P01".into()),
        );
        let ids: Vec<&str> = sel.slips.iter().map(|s| s.docket.docket_no.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(sel.slips.iter().all(|s| s.party.name == "ABC Company"));
    }

    #[test]
    fn test_unknown_selector_yields_empty_selection() {
        let dockets = vec![docket("1", "2024-12-05", "P01")];
        let sel = select(dockets, &[], &december(), &PartySelector::Code("NOPE".into()));
        assert!(sel.slips.is_empty());
        assert_eq!(sel.invalid_dates, 0);
    }

    #[test]
    fn test_join_is_left_join() {
        let dockets = vec![
            docket("1", "2024-12-05", "P01"),
            docket("2", "2024-12-06", "MISSING"),
            docket("3", "2024-12-07", ""),
        ];
        let parties = vec![party("P01", "ABC Company"), party("", "Codeless")];
        let sel = select(dockets, &parties, &december(), &PartySelector::All);
        assert_eq!(sel.slips.len(), 3);
        assert_eq!(sel.slips[0].party.name, "ABC Company");
        assert_eq!(sel.slips[1].party, PartyRecord::default());
        assert_eq!(sel.slips[2].party, PartyRecord::default());
    }

    #[test]
    fn test_duplicate_party_codes_use_first_record() {
        let dockets = vec![docket("1", "2024-12-05", "P01")];
        let parties = vec![party("P01", "First"), party("P01", "Second")];
        let sel = select(dockets, &parties, &december(), &PartySelector::All);
        assert_eq!(sel.slips[0].party.name, "First");
    }

    #[test]
    fn test_order_is_independent_of_read_order() {
        let base = vec![
            docket("1010", "2024-12-03", "P01"),
            docket("999", "2024-12-01", "P01"),
            docket("A-7", "2024-12-02", "P01"),
            docket("1002", "2024-12-09", "P01"),
        ];
        let mut reversed = base.clone();
        reversed.reverse();
        let a = select(base, &[], &december(), &PartySelector::All);
        let b = select(reversed, &[], &december(), &PartySelector::All);
        let ids = |s: &Selection| -> Vec<String> {
            s.slips.iter().map(|x| x.docket.docket_no.clone()).collect()
        };
        assert_eq!(ids(&a), vec!["999", "1002", "1010", "A-7"]);
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_ties_keep_read_order() {
        let mut first = docket("5", "2024-12-01", "P01");
        first.ref_no = "first".into();
        let mut second = docket("5", "2024-12-02", "P01");
        second.ref_no = "second".into();
        let sel = select(vec![first, second], &[], &december(), &PartySelector::All);
        assert_eq!(sel.slips[0].docket.ref_no, "first");
        assert_eq!(sel.slips[1].docket.ref_no, "second");
    }

    #[test]
    fn test_selector_from_code() {
        assert_eq!(PartySelector::from_code(None), PartySelector::All);
        assert_eq!(PartySelector::from_code(Some("  ")), PartySelector::All);
        assert_eq!(
            PartySelector::from_code(Some(" P01 ")),
            PartySelector::Code("P01".into())
        );
    }
}
