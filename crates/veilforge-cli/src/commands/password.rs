use clap::Args;
use veilforge_core::{generate_password, PasswordStrength, DEFAULT_PASSWORD_LEN};

use crate::CliResult;

/// Generates a random password to hide with
#[derive(Args, Debug)]
pub struct PasswordArgs {
    /// Number of characters
    #[arg(short, long, value_name = "chars", default_value_t = DEFAULT_PASSWORD_LEN)]
    pub length: usize,

    /// Letters and digits only
    #[arg(long)]
    pub no_symbols: bool,

    /// Print the password and its strength as JSON
    #[arg(long)]
    pub json: bool,
}

impl PasswordArgs {
    pub fn run(self) -> CliResult<()> {
        let password = generate_password(self.length, !self.no_symbols);
        let strength = PasswordStrength::of_len(self.length);

        if self.json {
            let json = serde_json::json!({
                "password": password,
                "length": self.length,
                "strength": strength.to_string(),
            });
            println!("{json}");
            return Ok(());
        }

        println!("{password}");
        eprintln!("strength: {strength}");

        Ok(())
    }
}
