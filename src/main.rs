//! Cellwise - evaluate and edit spreadsheets from the command line

mod args;
mod settings;

use anyhow::{Context, Result};
use args::{Command, Options};
use cellwise_core::Spreadsheet;

fn print_usage() {
    eprintln!("Usage: cellwise [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to open (.cws)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <NAME=CONTENT>  Set a cell (can be repeated, applied in order)");
    eprintln!("  -o, --output <FILE>       Save the resulting sheet to FILE");
    eprintln!("  -w, --write               Save the resulting sheet back to [FILE]");
    eprintln!("  --config <FILE>           Read settings from FILE");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -h, --help                Print help");
}

fn main() {
    env_logger::init();

    let command = match args::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(2);
        }
    };

    let options = match command {
        Command::Help => {
            print_usage();
            return;
        }
        Command::Run(options) => options,
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    let settings = settings::load(options)?;

    let mut sheet = match &options.file {
        Some(path) if path.exists() => Spreadsheet::open(path, &settings)
            .with_context(|| format!("failed to open {}", path.display()))?,
        _ => Spreadsheet::from_settings(&settings),
    };

    for edit in &options.edits {
        let order = sheet
            .set_cell_opt(Some(&edit.name), edit.content.as_deref())
            .with_context(|| format!("failed to set {}", edit.name))?;
        log::info!("{}: recalculated {}", edit.name, order.join(", "));
    }

    for name in sheet.sorted_cells() {
        let contents = sheet.contents(name)?;
        let value = sheet.value(name)?;
        println!("{}\t{}\t{}", name, contents, value);
    }

    let output = if options.write_back {
        options.file.as_ref()
    } else {
        options.output.as_ref()
    };
    if let Some(path) = output {
        sheet
            .save(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        log::info!("saved {}", path.display());
    }

    Ok(())
}
