use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::{CipherError, Key, Result, KEY_LEN};

/// Argon2id cost parameters, stored next to every sealed payload so that
/// opening never depends on the defaults of the build that sealed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// memory cost in KiB
    pub m_cost: u32,
    /// number of passes
    pub t_cost: u32,
    /// degree of parallelism
    pub p_cost: u32,
}

impl Default for KdfParams {
    /// argon2 default memory cost with increased time cost
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: 10,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// 1 GiB, the ceiling a carrier may make us allocate before the tag is checked
    pub const MAX_M_COST: u32 = 1024 * 1024;
    pub const MAX_T_COST: u32 = 64;
    pub const MAX_P_COST: u32 = 64;

    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost,
            t_cost,
            p_cost,
        }
    }

    /// Cheaper parameters for interactive use, still memory hard
    pub fn interactive() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: 2,
            p_cost: 1,
        }
    }

    /// Bounds check used before trusting parameters read from a carrier.
    pub fn is_plausible(&self) -> bool {
        (1..=Self::MAX_T_COST).contains(&self.t_cost)
            && (1..=Self::MAX_P_COST).contains(&self.p_cost)
            && self.m_cost >= 8 * self.p_cost
            && self.m_cost <= Self::MAX_M_COST
    }

    fn argon2<'key>(&self) -> Result<Argon2<'key>> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_LEN))
            .map_err(CipherError::KeyDerivationParamError)?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

pub(crate) fn derive_key(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<Key> {
    let mut output_key_material = Zeroizing::new([0u8; KEY_LEN]);
    params
        .argon2()?
        .hash_password_into(password, salt, output_key_material.as_mut())
        .map_err(CipherError::KeyDerivationError)?;

    Ok(output_key_material)
}
