use std::fmt::{self, Debug, Formatter};

use crate::{Result, VeilError};

#[derive(Default, Clone)]
pub struct Password(Option<String>);

impl Password {
    /// the password, an empty one counts as missing
    pub fn require(&self) -> Result<&str> {
        match self.0.as_deref() {
            Some(password) if !password.is_empty() => Ok(password),
            _ => Err(VeilError::MissingPassword),
        }
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(password) = &self.0 {
            write!(f, "Password({})", "*".repeat(password.len()))
        } else {
            write!(f, "Password(None)")
        }
    }
}

impl From<Option<String>> for Password {
    fn from(password: Option<String>) -> Self {
        Self(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self(Some(password.to_string()))
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(Some(password))
    }
}

impl AsRef<Option<String>> for Password {
    fn as_ref(&self) -> &Option<String> {
        &self.0
    }
}
