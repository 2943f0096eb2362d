use std::path::PathBuf;

use clap::{ArgGroup, Args};
use log::warn;
use veilforge_core::{EngineOptions, MetadataRecord, OperationReport};

use crate::CliResult;

/// Hides a message, a file or a metadata record as a new layer
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("payload")
        .required(true)
        .args(["data_file", "message", "record"])
))]
pub struct HideArgs {
    /// Password used to encrypt the data, asked for when missing
    #[arg(short, long, value_name = "password")]
    pub password: Option<String>,

    /// Carrier such as a PNG, WAV, Y4M, MP4, PDF, DOCX or text file, used readonly.
    #[arg(short = 'i', long = "in", value_name = "media file", required = true)]
    pub media: PathBuf,

    /// Final carrier will be stored as file
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output media file",
        required = true
    )]
    pub write_to_file: PathBuf,

    /// File to hide in the carrier
    #[arg(short = 'd', long = "data", value_name = "data file")]
    pub data_file: Option<PathBuf>,

    /// A text message that will be hidden
    #[arg(short, long, value_name = "text message")]
    pub message: Option<String>,

    /// JSON metadata record that will be hidden
    #[arg(short, long, value_name = "record json file")]
    pub record: Option<PathBuf>,

    /// Deflate the payload before sealing when that makes it smaller
    #[arg(long)]
    pub compress: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl HideArgs {
    pub fn run(self, options: EngineOptions) -> CliResult<()> {
        let password = match self.password {
            None => crate::cli::ask_for_password(true),
            password => password,
        };

        let mut api = veilforge_core::api::hide::prepare()
            .with_options(options.with_compression(self.compress))
            .with_carrier(&self.media)?
            .with_output(&self.write_to_file)
            .using_password(password);
        if let Some(message) = &self.message {
            api = api.with_message(message);
        }
        if let Some(data_file) = &self.data_file {
            api = api.with_file(data_file);
        }
        if let Some(record) = &self.record {
            let json = std::fs::read_to_string(record)?;
            api = api.with_record(MetadataRecord::from_json(&json)?);
        }

        let result = api.execute();
        if self.json {
            let report = OperationReport::from(result);
            println!("{}", report.to_json());
            if !report.success {
                std::process::exit(1);
            }
            return Ok(());
        }

        let concealed = result?;
        for warning in &concealed.warnings {
            warn!("{warning}");
        }
        println!(
            "hidden {} as layer {} of {}, {} of {} bytes used",
            concealed.display_name,
            concealed.layer_index,
            concealed.format,
            concealed.capacity.required_bytes,
            concealed.capacity.capacity_bytes
        );

        Ok(())
    }
}
