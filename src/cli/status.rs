use colored::Colorize;

use crate::error::Result;
use crate::settings::{settings_path, Settings};
use crate::store::probe;

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

pub fn run(settings: &Settings) -> Result<()> {
    let config = settings.to_config()?;

    println!("Settings:   {}", settings_path().display());
    println!("Encoding:   {}", config.encoding.name());
    println!("Origin:     {}", or_unset(&config.default_origin));
    println!("Sender:     {}", or_unset(&config.slip.sender.name));
    println!("Per page:   {}", config.slip.per_page);
    println!(
        "Logo:       {}",
        config
            .slip
            .logo
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Output dir: {}", settings.output_dir().display());

    for (label, path) in [("Dockets", &config.dockets_path), ("Parties", &config.parties_path)] {
        println!();
        println!("{label}:    {}", path.display());
        match probe(path, config.encoding) {
            Ok(p) => {
                println!("  Records:   {} ({} declared)", p.readable, p.declared);
                println!("  Encoding:  {}", p.encoding);
                if p.malformed > 0 {
                    println!("  {}", format!("Malformed: {}", p.malformed).yellow());
                }
                println!("  Fields:    {}", p.fields.join(", "));
                for sample in &p.samples {
                    println!("  Sample:    {sample}");
                }
            }
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }

    Ok(())
}
