use crate::{Result, VeilError};

/// Options for LSB image hiding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    /// Determines the step width when iterating over the color channels.
    /// For example `2` would move from (R)GBA to RG(B)A.
    /// Depending on if the alpha channel is skipped (`skip_alpha_channel`) it would either
    /// not count alpha at all or it does.
    ///
    /// Note this number influences the capacity directly.
    pub color_channel_step_increment: usize,

    /// If true no alpha channel would be used for hiding,
    /// this reduces then the capacity by one bit per pixel
    pub skip_alpha_channel: bool,

    /// This limits all iterations to skip the last column and row, in fact it reduces width and height of the image by 1
    pub skip_last_row_and_column: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            color_channel_step_increment: 1,
            skip_alpha_channel: true,
            skip_last_row_and_column: true,
        }
    }
}

impl ImageOptions {
    pub fn validate(&self) -> Result<()> {
        if self.color_channel_step_increment == 0 {
            return Err(VeilError::InvalidOptions(
                "color channel step increment must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options for transform domain audio hiding
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOptions {
    /// samples per DCT block
    pub block_len: usize,
    /// first coefficient that carries data
    pub band_start: usize,
    /// number of coefficients per block that carry data
    pub band_len: usize,
    /// quantization step of the coefficients, in sample units
    pub step: f64,
    /// copies of every bit, decoded by majority vote
    pub redundancy: usize,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            block_len: 16,
            band_start: 4,
            band_len: 4,
            step: 32.0,
            redundancy: 3,
        }
    }
}

impl AudioOptions {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(VeilError::InvalidOptions(reason.to_string()));

        if self.block_len < 2 {
            return invalid("audio block length must be at least 2");
        }
        if self.band_len == 0 || self.band_start == 0 {
            return invalid("audio band must not be empty and must leave the DC coefficient alone");
        }
        if self.band_start + self.band_len > self.block_len {
            return invalid("audio band exceeds the block length");
        }
        if !(self.step.is_finite() && self.step >= 4.0) {
            return invalid("audio quantization step must be at least 4");
        }
        if self.redundancy == 0 || self.redundancy % 2 == 0 {
            return invalid("audio redundancy must be odd");
        }
        Ok(())
    }
}

/// Options for raw video hiding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOptions {
    /// every n-th frame carries data, starting with the first
    pub frame_stride: usize,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self { frame_stride: 2 }
    }
}

impl VideoOptions {
    pub fn validate(&self) -> Result<()> {
        if self.frame_stride == 0 {
            return Err(VeilError::InvalidOptions(
                "frame stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
