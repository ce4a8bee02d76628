use std::path::PathBuf;

use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use crate::cli::generate::{print_preview, NO_DOCKETS};
use crate::cli::{parse_date_arg, print_warnings, write_pdf};
use crate::error::Result;
use crate::models::PartyRecord;
use crate::pipeline::{self, Outcome, Request};
use crate::selection::{DateRange, PartySelector};
use crate::settings::Settings;
use crate::store::{list_parties, load_parties};

const SHOWN_PARTIES: usize = 10;

/// Interpret a party choice: `0` for all parties, a 1-based list number, or
/// a party code (case-insensitive).
pub(crate) fn resolve_choice(choice: &str, parties: &[PartyRecord]) -> Option<PartySelector> {
    let choice = choice.trim();
    if choice == "0" {
        return Some(PartySelector::All);
    }
    if let Ok(n) = choice.parse::<usize>() {
        if n >= 1 && n <= parties.len() {
            return Some(PartySelector::Code(parties[n - 1].code.clone()));
        }
    }
    parties
        .iter()
        .find(|p| p.code.eq_ignore_ascii_case(choice))
        .map(|p| PartySelector::Code(p.code.clone()))
}

fn prompt_date(prompt: &str) -> Result<NaiveDate> {
    loop {
        let raw: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse_date_arg(&raw) {
            Ok(d) => return Ok(d),
            Err(_) => println!("{}", "Invalid date format. Please use YYYY-MM-DD.".red()),
        }
    }
}

fn prompt_range() -> Result<DateRange> {
    loop {
        let start = prompt_date("Start date (YYYY-MM-DD)")?;
        let end = prompt_date("End date (YYYY-MM-DD)")?;
        match DateRange::new(start, end) {
            Ok(range) => return Ok(range),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

fn prompt_party(parties: &[PartyRecord]) -> Result<PartySelector> {
    println!("\nAvailable parties ({}):", parties.len());
    for (i, party) in parties.iter().take(SHOWN_PARTIES).enumerate() {
        println!("{}. {} ({})", i + 1, party.name, party.code);
    }
    if parties.len() > SHOWN_PARTIES {
        println!("... and {} more parties", parties.len() - SHOWN_PARTIES);
    }
    println!("0. All parties");

    loop {
        let choice: String = Input::new()
            .with_prompt("Select party (number or code)")
            .interact_text()?;
        match resolve_choice(&choice, parties) {
            Some(selector) => return Ok(selector),
            None => println!("{}", "Invalid selection.".red()),
        }
    }
}

pub fn run(settings: &Settings, output_dir: Option<String>) -> Result<()> {
    let config = settings.to_config()?;
    let parties = list_parties(load_parties(&config.parties_path, config.encoding)?.records);

    let range = prompt_range()?;
    let selector = prompt_party(&parties)?;
    let preview = pipeline::preview(&config, &Request { range, selector })?;

    print_warnings(&preview.warnings);
    if preview.slips.is_empty() {
        println!("{}", NO_DOCKETS.yellow());
        return Ok(());
    }
    print_preview(&preview);

    let proceed = Confirm::new()
        .with_prompt(format!("Generate {} receipts?", preview.slips.len()))
        .default(true)
        .interact()?;
    if !proceed {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    if let Outcome::Document(doc) = pipeline::render(&config, preview)? {
        let dir = output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| settings.output_dir());
        write_pdf(&doc.bytes, &dir.join(&doc.filename))?;
        println!(
            "{}",
            format!("{} receipts on {} pages.", doc.slips, doc.pages).green()
        );
    }
    Ok(())
}
