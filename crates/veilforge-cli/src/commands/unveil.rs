use std::path::PathBuf;

use clap::Args;
use log::warn;
use veilforge_core::{EngineOptions, LayerSelector, OperationReport};

use crate::CliResult;

/// Unveils the latest readable layer, or the given one
#[derive(Args, Debug)]
pub struct UnveilArgs {
    /// Password used to encrypt the data, asked for when missing
    #[arg(short, long, value_name = "password")]
    pub password: Option<String>,

    /// Source media that contains secret data
    #[arg(
        short = 'i',
        long = "in",
        value_name = "media source file",
        required = true
    )]
    pub media: PathBuf,

    /// Final data will be stored in that folder
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output folder",
        required = true
    )]
    pub output_folder: PathBuf,

    /// Index of the layer to open, 0 is the oldest
    #[arg(short, long, value_name = "index")]
    pub layer: Option<usize>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl UnveilArgs {
    pub fn run(self, options: EngineOptions) -> CliResult<()> {
        let password = match self.password {
            None => crate::cli::ask_for_password(false),
            password => password,
        };
        let layer = self
            .layer
            .map(LayerSelector::Index)
            .unwrap_or(LayerSelector::Latest);

        let result = veilforge_core::api::unveil::prepare()
            .with_options(options)
            .from_secret_file(&self.media)?
            .into_output_folder(&self.output_folder)
            .using_password(password)
            .with_layer(layer)
            .execute();
        if self.json {
            let report = OperationReport::from(result);
            println!("{}", report.to_json());
            if !report.success {
                std::process::exit(1);
            }
            return Ok(());
        }

        let revealed = result?;
        for warning in &revealed.warnings {
            warn!("{warning}");
        }
        println!(
            "unveiled {} from layer {} into {}",
            revealed.display_name(),
            revealed.layer_index,
            self.output_folder.display()
        );

        Ok(())
    }
}
