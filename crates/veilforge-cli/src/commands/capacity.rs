use std::path::PathBuf;

use clap::Args;
use veilforge_core::EngineOptions;

use crate::CliResult;

/// Shows how much a carrier can still take
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Media file to inspect
    #[arg(short = 'i', long = "in", value_name = "media file", required = true)]
    pub media: PathBuf,

    /// File name the largest payload estimate is computed for
    #[arg(long, value_name = "name", default_value = "message.txt")]
    pub name: String,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CapacityArgs {
    pub fn run(self, options: EngineOptions) -> CliResult<()> {
        let mode = options.cipher.mode;
        let report = veilforge_core::api::layers::prepare()
            .with_options(options)
            .with_carrier(&self.media)?
            .capacity()?;

        if self.json {
            println!("{}", serde_json::json!(report));
            return Ok(());
        }

        println!("format:      {}", report.format);
        println!("raw:         {} bytes", report.raw_bytes);
        println!("capacity:    {} bytes", report.capacity_bytes);
        println!("used:        {} bytes", report.used_bytes);
        println!(
            "max payload: {} bytes",
            report.max_payload_len(self.name.len(), mode)
        );

        Ok(())
    }
}
