mod cli;
mod commands;

use clap::Parser;

use crate::cli::{CliArgs, Commands};

pub type CliResult<T> = veilforge_core::Result<T>;

fn main() -> CliResult<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let options = args.engine_options()?;

    match args.command {
        Commands::Hide(hide) => hide.run(options),
        Commands::Unveil(unveil) => unveil.run(options),
        Commands::Layers(layers) => layers.run(options),
        Commands::Capacity(capacity) => capacity.run(options),
        Commands::Password(password) => password.run(),
    }
}
