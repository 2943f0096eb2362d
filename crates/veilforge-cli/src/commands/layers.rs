use std::path::PathBuf;

use clap::Args;
use veilforge_core::{EngineOptions, LayerStatus};

use crate::CliResult;

/// Lists the layers hidden in a carrier, without a password
#[derive(Args, Debug)]
pub struct LayersArgs {
    /// Media file to inspect
    #[arg(short = 'i', long = "in", value_name = "media file", required = true)]
    pub media: PathBuf,

    /// Print the layers as JSON
    #[arg(long)]
    pub json: bool,
}

impl LayersArgs {
    pub fn run(self, options: EngineOptions) -> CliResult<()> {
        let listing = veilforge_core::api::layers::prepare()
            .with_options(options)
            .with_carrier(&self.media)?
            .list()?;

        if self.json {
            let json = serde_json::json!({
                "slots": listing.slots,
                "warnings": listing.warnings,
            });
            println!("{json}");
            return Ok(());
        }

        if listing.slots.is_empty() {
            println!("no layers in {}", self.media.display());
        }
        for slot in &listing.slots {
            match slot.status {
                LayerStatus::Valid => println!(
                    "#{} {} {} ({} bytes sealed)",
                    slot.index,
                    slot.kind.map(|k| format!("{k:?}")).unwrap_or_default(),
                    slot.display_name.as_deref().unwrap_or_default(),
                    slot.length.unwrap_or_default()
                ),
                LayerStatus::Malformed => println!("#{} malformed", slot.index),
            }
        }
        for warning in &listing.warnings {
            println!("warning: {warning}");
        }

        Ok(())
    }
}
