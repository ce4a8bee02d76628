use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{parse_date_arg, print_warnings, write_pdf};
use crate::error::Result;
use crate::layout::SlipBlock;
use crate::pipeline::{self, Outcome, Preview, Request};
use crate::selection::{DateRange, PartySelector};
use crate::settings::Settings;

pub const NO_DOCKETS: &str = "No dockets found for the selected criteria.";

pub struct GenerateArgs {
    pub from_date: String,
    pub to_date: String,
    pub party: Option<String>,
    pub output: Option<String>,
    pub output_dir: Option<String>,
    pub dry_run: bool,
}

pub fn run(settings: &Settings, args: GenerateArgs) -> Result<()> {
    let config = settings.to_config()?;
    let range = DateRange::new(parse_date_arg(&args.from_date)?, parse_date_arg(&args.to_date)?)?;
    let request = Request {
        range,
        selector: PartySelector::from_code(args.party.as_deref()),
    };

    if args.dry_run {
        let preview = pipeline::preview(&config, &request)?;
        print_warnings(&preview.warnings);
        if preview.slips.is_empty() {
            println!("{}", NO_DOCKETS.yellow());
        } else {
            print_preview(&preview);
        }
        return Ok(());
    }

    match pipeline::generate(&config, &request)? {
        Outcome::Empty { warnings } => {
            print_warnings(&warnings);
            println!("{}", NO_DOCKETS.yellow());
        }
        Outcome::Document(doc) => {
            print_warnings(&doc.warnings);
            let path = match args.output {
                Some(p) => PathBuf::from(p),
                None => args
                    .output_dir
                    .map(PathBuf::from)
                    .unwrap_or_else(|| settings.output_dir())
                    .join(&doc.filename),
            };
            write_pdf(&doc.bytes, &path)?;
            println!(
                "{}",
                format!("{} receipts on {} pages.", doc.slips, doc.pages).green()
            );
        }
    }
    Ok(())
}

pub(crate) fn print_preview(preview: &Preview) {
    let mut table = Table::new();
    table.set_header(vec!["Docket", "Date", "Consignee", "Destination", "Weight", "Amount"]);
    for slip in &preview.slips {
        let block = SlipBlock::from_slip(slip);
        table.add_row(vec![
            Cell::new(block.docket_no),
            Cell::new(block.date),
            Cell::new(block.receiver.name),
            Cell::new(block.destination),
            Cell::new(block.weight),
            Cell::new(block.amount),
        ]);
    }
    println!("{table}");
    println!("{} dockets \u{2192} {}", preview.slips.len(), preview.filename);
}
