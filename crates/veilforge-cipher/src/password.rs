//! Random passwords for users who do not bring their own.

use std::fmt;

use rand::rngs::OsRng;
use rand::Rng;

pub const DEFAULT_PASSWORD_LEN: usize = 16;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Rating of a generated password, by length alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn of_len(len: usize) -> Self {
        match len {
            12.. => PasswordStrength::Strong,
            8..=11 => PasswordStrength::Medium,
            _ => PasswordStrength::Weak,
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        })
    }
}

/// Draws `len` characters from letters and digits, plus punctuation when `symbols` is set.
pub fn generate_password(len: usize, symbols: bool) -> String {
    let alphabet = if symbols {
        [ALPHANUMERIC, SYMBOLS].concat()
    } else {
        ALPHANUMERIC.to_vec()
    };
    let mut rng = OsRng;

    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_has_the_requested_length() {
        for len in [0, 1, 8, DEFAULT_PASSWORD_LEN, 64] {
            assert_eq!(generate_password(len, true).chars().count(), len);
        }
    }

    #[test]
    fn test_password_stays_in_its_alphabet() {
        let plain = generate_password(256, false);
        assert!(plain.bytes().all(|b| b.is_ascii_alphanumeric()));

        let with_symbols = generate_password(256, true);
        assert!(with_symbols
            .bytes()
            .all(|b| ALPHANUMERIC.contains(&b) || SYMBOLS.contains(&b)));
    }

    #[test]
    fn test_passwords_differ() {
        assert_ne!(generate_password(32, true), generate_password(32, true));
    }

    #[test]
    fn test_strength_by_length() {
        assert_eq!(PasswordStrength::of_len(0), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::of_len(7), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::of_len(8), PasswordStrength::Medium);
        assert_eq!(PasswordStrength::of_len(11), PasswordStrength::Medium);
        assert_eq!(PasswordStrength::of_len(12), PasswordStrength::Strong);
        assert_eq!(PasswordStrength::Strong.to_string(), "strong");
    }
}
