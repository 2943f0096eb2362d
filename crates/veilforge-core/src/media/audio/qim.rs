//! Quantization index modulation on mid band DCT coefficients.
//!
//! Coefficient slots are ordered by channel, then block, then coefficient.
//! Every data bit occupies `redundancy` consecutive slots and is read back
//! by majority vote.

use std::io::{self, Cursor, Read};

use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, LittleEndian};

use super::dct::Dct;
use crate::media::AudioOptions;

fn qim_embed(c: f64, step: f64, bit: bool) -> f64 {
    if bit {
        ((c / step - 0.5).round() + 0.5) * step
    } else {
        (c / step).round() * step
    }
}

fn qim_extract(c: f64, step: f64) -> bool {
    let m = (c / (step / 2.0)).round() as i64;
    m.rem_euclid(2) == 1
}

/// Geometry of the coefficient slots of one interleaved sample buffer.
#[derive(Debug, Clone)]
pub(crate) struct SlotLayout {
    channels: usize,
    blocks_per_channel: usize,
    options: AudioOptions,
}

impl SlotLayout {
    pub fn new(sample_count: usize, channels: usize, options: &AudioOptions) -> Self {
        let channels = channels.max(1);
        Self {
            channels,
            blocks_per_channel: sample_count / channels / options.block_len,
            options: options.clone(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.channels * self.blocks_per_channel * self.options.band_len
    }

    /// number of data bits the layout can carry
    pub fn bit_capacity(&self) -> usize {
        self.slot_count() / self.options.redundancy
    }

    /// interleaved sample indices of the block with the given running number
    fn block_indices(&self, block: usize) -> impl Iterator<Item = usize> {
        let channel = block / self.blocks_per_channel;
        let first_frame = (block % self.blocks_per_channel) * self.options.block_len;
        let channels = self.channels;

        (first_frame..first_frame + self.options.block_len).map(move |f| f * channels + channel)
    }

    fn load(&self, samples: &[i16], block: usize) -> Vec<f64> {
        self.block_indices(block)
            .map(|i| samples[i] as f64)
            .collect()
    }
}

/// Hides `data` in the samples. Fails with `WriteZero` when not all bits fit,
/// in which case the samples are left untouched.
pub(crate) fn embed(samples: &mut [i16], layout: &SlotLayout, data: &[u8]) -> io::Result<()> {
    let opts = &layout.options;
    let bit_count = data.len() * 8;
    if bit_count > layout.bit_capacity() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            "not enough coefficient slots",
        ));
    }

    let mut reader = BitReader::endian(Cursor::new(data), LittleEndian);
    let bits = (0..bit_count)
        .map(|_| reader.read_bit())
        .collect::<io::Result<Vec<bool>>>()?;

    let slots_needed = bit_count * opts.redundancy;
    let dct = Dct::new(opts.block_len);
    for block in 0..slots_needed.div_ceil(opts.band_len) {
        let mut coefficients = dct.forward(&layout.load(samples, block));
        for k in 0..opts.band_len {
            let slot = block * opts.band_len + k;
            if slot >= slots_needed {
                break;
            }
            let c = &mut coefficients[opts.band_start + k];
            *c = qim_embed(*c, opts.step, bits[slot / opts.redundancy]);
        }

        let restored = dct.inverse(&coefficients);
        for (i, value) in layout.block_indices(block).zip(restored) {
            samples[i] = value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        }
    }

    Ok(())
}

/// Reads bytes back from the coefficient slots, block by block.
pub(crate) struct QimDecoder<'s> {
    samples: &'s [i16],
    layout: SlotLayout,
    dct: Dct,
    next_slot: usize,
    block: Option<(usize, Vec<f64>)>,
}

impl<'s> QimDecoder<'s> {
    pub fn new(samples: &'s [i16], layout: SlotLayout) -> Self {
        let dct = Dct::new(layout.options.block_len);
        Self {
            samples,
            layout,
            dct,
            next_slot: 0,
            block: None,
        }
    }

    fn next_coefficient(&mut self) -> Option<f64> {
        if self.next_slot >= self.layout.slot_count() {
            return None;
        }
        let band_len = self.layout.options.band_len;
        let block = self.next_slot / band_len;
        let k = self.next_slot % band_len;
        self.next_slot += 1;

        if !matches!(&self.block, Some((b, _)) if *b == block) {
            let coefficients = self.dct.forward(&self.layout.load(self.samples, block));
            self.block = Some((block, coefficients));
        }
        self.block
            .as_ref()
            .map(|(_, c)| c[self.layout.options.band_start + k])
    }

    fn next_bit(&mut self) -> Option<bool> {
        let redundancy = self.layout.options.redundancy;
        let step = self.layout.options.step;
        let mut ones = 0;
        for _ in 0..redundancy {
            if qim_extract(self.next_coefficient()?, step) {
                ones += 1;
            }
        }

        Some(ones * 2 > redundancy)
    }
}

impl Read for QimDecoder<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let wanted = buf.len();
        let mut read = 0;
        let mut writer = BitWriter::endian(buf, LittleEndian);

        'bytes: while read < wanted {
            for _ in 0..8 {
                let Some(bit) = self.next_bit() else {
                    break 'bytes;
                };
                writer.write_bit(bit)?;
            }
            read += 1;
        }

        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, channels: usize) -> Vec<i16> {
        (0..len * channels)
            .map(|i| {
                let t = (i / channels) as f64;
                ((t * 0.05).sin() * 6000.0 + (t * 0.31).sin() * 900.0) as i16
            })
            .collect()
    }

    #[test]
    fn qim_survives_small_noise() {
        for c in [-1000.3, -7.0, 0.0, 3.9, 511.5, 12000.0] {
            for bit in [false, true] {
                let q = qim_embed(c, 32.0, bit);
                assert_eq!(qim_extract(q, 32.0), bit);
                assert_eq!(qim_extract(q + 5.0, 32.0), bit);
                assert_eq!(qim_extract(q - 5.0, 32.0), bit);
            }
        }
    }

    #[test]
    fn should_embed_and_read_back_through_rounding() {
        let opts = AudioOptions::default();
        let mut samples = tone(4000, 2);
        let layout = SlotLayout::new(samples.len(), 2, &opts);
        // 2 channels, 250 blocks each, 4 slots per block, 3 slots per bit
        assert_eq!(layout.bit_capacity(), 2 * 250 * 4 / 3);

        let secret = b"Hello World!";
        embed(&mut samples, &layout, secret).unwrap();

        let mut buf = [0u8; 12];
        QimDecoder::new(&samples, layout)
            .read_exact(&mut buf)
            .unwrap();
        assert_eq!(&buf, secret);
    }

    #[test]
    fn should_leave_untouched_blocks_alone() {
        let opts = AudioOptions::default();
        let original = tone(1600, 1);
        let mut samples = original.clone();
        let layout = SlotLayout::new(samples.len(), 1, &opts);

        // 8 bits, 24 slots, 6 blocks of 16 samples
        embed(&mut samples, &layout, &[0xa5]).unwrap();
        assert_eq!(&samples[6 * 16..], &original[6 * 16..]);
    }

    #[test]
    fn should_refuse_data_that_does_not_fit() {
        let opts = AudioOptions::default();
        let mut samples = tone(160, 1);
        let layout = SlotLayout::new(samples.len(), 1, &opts);
        assert_eq!(layout.bit_capacity(), 13);

        let err = embed(&mut samples, &layout, &[1, 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(samples, tone(160, 1));
    }
}
