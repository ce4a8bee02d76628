mod cli;
mod config;
mod dbf;
mod error;
mod fmt;
mod layout;
mod metrics;
mod models;
mod naming;
mod pdf;
mod pipeline;
mod selection;
mod settings;
mod store;
#[cfg(test)]
mod testutil;

use clap::Parser;
use env_logger::Env;

use cli::generate::GenerateArgs;
use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = cli::resolve_settings(&cli);

    let result = match cli.command {
        Commands::Generate {
            from_date,
            to_date,
            party,
            output,
            output_dir,
            dry_run,
        } => cli::generate::run(
            &settings,
            GenerateArgs {
                from_date,
                to_date,
                party,
                output,
                output_dir,
                dry_run,
            },
        ),
        Commands::Parties => cli::parties::run(&settings),
        Commands::Status => cli::status::run(&settings),
        Commands::Interactive { output_dir } => cli::interactive::run(&settings, output_dir),
        Commands::Init => cli::init::run(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
