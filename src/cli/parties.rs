use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::settings::Settings;
use crate::store::{list_parties, load_parties};

pub fn run(settings: &Settings) -> Result<()> {
    let config = settings.to_config()?;
    let loaded = load_parties(&config.parties_path, config.encoding)?;
    let parties = list_parties(loaded.records);

    if parties.is_empty() {
        println!("No parties found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Code", "Name", "City", "Phone"]);
    for (i, party) in parties.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&party.code),
            Cell::new(&party.name),
            Cell::new(&party.city),
            Cell::new(party.contact()),
        ]);
    }
    println!("Parties\n{table}");
    if loaded.malformed > 0 {
        println!("({} malformed rows skipped)", loaded.malformed);
    }
    Ok(())
}
