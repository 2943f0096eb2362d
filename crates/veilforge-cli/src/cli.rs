use clap::{Parser, Subcommand};
use dialoguer::Password;
use veilforge_core::{CipherMode, CipherOptions, EngineOptions, KdfParams};

use crate::commands::*;
use crate::CliResult;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Experimental: image color channel step increment
    #[arg(long = "x-color-step-increment", default_value = "1", global = true)]
    pub color_step_increment: usize,

    /// Every n-th Y4M frame carries data
    #[arg(long = "frame-stride", value_name = "frames", global = true)]
    pub frame_stride: Option<usize>,

    /// Seal with the BLAKE3 keystream instead of XChaCha20-Poly1305
    #[arg(long, global = true)]
    pub keystream: bool,

    /// Cheaper Argon2id passes for interactive use
    #[arg(long = "kdf-fast", global = true)]
    pub kdf_fast: bool,

    /// Argon2id memory cost in KiB
    #[arg(long = "kdf-memory", value_name = "KiB", global = true)]
    pub kdf_memory: Option<u32>,

    /// Argon2id passes
    #[arg(long = "kdf-passes", value_name = "passes", global = true)]
    pub kdf_passes: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Hide(hide::HideArgs),
    Unveil(unveil::UnveilArgs),
    Layers(layers::LayersArgs),
    Capacity(capacity::CapacityArgs),
    Password(password::PasswordArgs),
}

impl CliArgs {
    pub fn engine_options(&self) -> CliResult<EngineOptions> {
        let mut options = EngineOptions::default();
        options.image.color_channel_step_increment = self.color_step_increment;
        if let Some(stride) = self.frame_stride {
            options.video.frame_stride = stride;
        }

        let defaults = if self.kdf_fast {
            KdfParams::interactive()
        } else {
            KdfParams::default()
        };
        let kdf = KdfParams::new(
            self.kdf_memory.unwrap_or(defaults.m_cost),
            self.kdf_passes.unwrap_or(defaults.t_cost),
            defaults.p_cost,
        );
        let mode = if self.keystream {
            CipherMode::Keystream
        } else {
            CipherMode::Aead
        };

        let options = options.with_cipher(CipherOptions::new(mode, kdf));
        options.validate()?;

        Ok(options)
    }
}

/// Prompts for the password, hiding asks twice.
pub fn ask_for_password(confirm: bool) -> Option<String> {
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }

    prompt.interact().ok()
}
