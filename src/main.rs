use clap::Parser;
use jacquard::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{consensus, filter_hc_somatic, normalize, tag},
    constants::JacquardConfig,
    utils::util::{handle_error_and_exit, Result},
};
use std::{env, time};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    log::trace!("CLI options set: {:?}", cli);

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        &**FULL_VERSION,
        cli.command.name()
    );

    let config = JacquardConfig::new(
        FULL_VERSION.to_string(),
        env::args().collect::<Vec<_>>().join(" "),
        env::current_dir()?,
    );

    let start_timer = time::Instant::now();
    match cli.command {
        Command::Normalize(args) => {
            log::trace!("Normalize arguments: {:#?}", args);
            normalize(&args, &config)?
        }
        Command::Tag(args) => {
            log::trace!("Tag arguments: {:#?}", args);
            tag(&args, &config)?
        }
        Command::Consensus(args) => {
            log::trace!("Consensus arguments: {:#?}", args);
            consensus(&args, &config)?
        }
        Command::FilterHcSomatic(args) => {
            log::trace!("Filter arguments: {:#?}", args);
            filter_hc_somatic(&args, &config)?
        }
    }
    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
