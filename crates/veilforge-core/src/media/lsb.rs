//! Least significant bit reader and writer over byte samples.
//!
//! Both directions address the carrier by positions into a flat byte
//! buffer, so the same codec serves RGBA pixel buffers and video luma
//! planes. Bits are taken LSB first from every data byte.

use std::io::{self, Cursor, Read, Write};

use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, LittleEndian};

/// Writes data into the lowest bit of the addressed carrier bytes.
pub struct LsbEncoder<'c, P: Iterator<Item = usize>> {
    carrier: &'c mut [u8],
    positions: P,
}

impl<'c, P: Iterator<Item = usize>> LsbEncoder<'c, P> {
    pub fn new(carrier: &'c mut [u8], positions: P) -> Self {
        Self { carrier, positions }
    }
}

impl<P: Iterator<Item = usize>> Write for LsbEncoder<'_, P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bits = BitReader::endian(Cursor::new(buf), LittleEndian);
        let mut written = 0;

        'bytes: for _ in buf {
            let mut slots = [0usize; 8];
            for slot in slots.iter_mut() {
                match self.positions.next() {
                    Some(p) if p < self.carrier.len() => *slot = p,
                    _ => break 'bytes,
                }
            }
            for p in slots {
                let bit = bits.read_bit()?;
                let c = &mut self.carrier[p];
                *c = (*c & (u8::MAX - 1)) | u8::from(bit);
            }
            written += 1;
        }

        if written == 0 && !buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "no carrier bytes left",
            ));
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads data back from the lowest bit of the addressed carrier bytes.
pub struct LsbDecoder<'c, P: Iterator<Item = usize>> {
    carrier: &'c [u8],
    positions: P,
}

impl<'c, P: Iterator<Item = usize>> LsbDecoder<'c, P> {
    pub fn new(carrier: &'c [u8], positions: P) -> Self {
        Self { carrier, positions }
    }
}

impl<P: Iterator<Item = usize>> Read for LsbDecoder<'_, P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let wanted = buf.len();
        let mut read = 0;
        let mut writer = BitWriter::endian(buf, LittleEndian);

        'bytes: while read < wanted {
            for _ in 0..8 {
                let Some(bit) = self
                    .positions
                    .next()
                    .and_then(|p| self.carrier.get(p))
                    .map(|c| c & 1 == 1)
                else {
                    break 'bytes;
                };
                writer.write_bit(bit)?;
            }
            read += 1;
        }

        Ok(read)
    }
}
