// CLI binary entry point for tagscan

use clap::Parser;
use std::process;

mod cli;

use cli::output::OutputFormatter;
use cli::Config;

fn main() {
    let config = Config::parse();
    cli::init_logging(&config);

    if let Err(e) = run(config) {
        eprintln!("✗ {:#}", e);
        process::exit(1);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let scan_config = cli::load_scan_config(config.config.as_deref())?;
    let formatter = OutputFormatter::new(config.format, config.quiet);
    cli::commands::run(config.command, &scan_config, &formatter)?;
    Ok(())
}
