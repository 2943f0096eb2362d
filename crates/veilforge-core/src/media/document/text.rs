use log::debug;

use crate::media::frame;
use crate::media::{CarrierFormat, Concealer};
use crate::{Result, VeilError};

const FORMAT: &str = "text document";
/// trailing whitespace characters per hidden byte
const PATTERN_LEN: usize = 8;
const ZERO: char = ' ';
const ONE: char = '\t';

/// UTF-8 text, one hidden byte per line as trailing whitespace.
#[derive(Debug, Clone)]
pub struct TextCarrier {
    text: String,
}

/// splits a line into its content and its line ending
fn split_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn is_pattern_char(c: char) -> bool {
    c == ZERO || c == ONE
}

impl TextCarrier {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| VeilError::invalid_carrier(FORMAT, e.to_string()))?;
        debug!("{FORMAT} with {} lines", text.split_inclusive('\n').count());

        Ok(Self {
            text: text.to_string(),
        })
    }

    fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split_inclusive('\n')
    }
}

impl Concealer for TextCarrier {
    fn format(&self) -> CarrierFormat {
        CarrierFormat::Text
    }

    fn raw_capacity(&self) -> usize {
        self.lines().count()
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        if framed.len() > self.raw_capacity() {
            return Err(VeilError::CapacityExceeded {
                required: framed.len(),
                capacity: self.raw_capacity(),
            });
        }

        let mut out = String::with_capacity(self.text.len() + framed.len() * PATTERN_LEN);
        let mut data = framed.iter();
        for line in self.lines() {
            match data.next() {
                Some(byte) => {
                    let (body, ending) = split_ending(line);
                    out.push_str(body.trim_end_matches(is_pattern_char));
                    for bit in 0..PATTERN_LEN {
                        out.push(if byte >> bit & 1 == 1 { ONE } else { ZERO });
                    }
                    out.push_str(ending);
                }
                None => out.push_str(line),
            }
        }

        Ok(out.into_bytes())
    }

    fn extract(&self) -> Result<Vec<u8>> {
        let mut framed = Vec::new();
        for line in self.lines() {
            let (body, _) = split_ending(line);
            let stem = body.trim_end_matches(is_pattern_char);
            let pattern = &body[stem.len()..];
            if pattern.len() < PATTERN_LEN {
                break;
            }

            let byte = pattern[pattern.len() - PATTERN_LEN..]
                .chars()
                .enumerate()
                .fold(0u8, |acc, (bit, c)| acc | (u8::from(c == ONE) << bit));
            framed.push(byte);
        }

        frame::unwrap(&framed).map(|region| region.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::text_bytes;

    #[test]
    fn should_hide_one_byte_per_line() {
        let carrier = TextCarrier::parse(&text_bytes(40)).unwrap();
        assert_eq!(carrier.raw_capacity(), 40);

        let out = carrier.embed(b"tiny").unwrap();
        let reparsed = TextCarrier::parse(&out).unwrap();
        assert_eq!(reparsed.raw_capacity(), 40);
        assert_eq!(reparsed.extract().unwrap(), b"tiny");
    }

    #[test]
    fn should_keep_visible_text_and_line_endings() {
        let text = "first line  \r\nsecond\nthird\n";
        let carrier = TextCarrier::parse(text.as_bytes()).unwrap();
        // three lines cannot even take the frame header
        assert!(matches!(
            carrier.embed(b""),
            Err(VeilError::CapacityExceeded { .. })
        ));

        let long: String = (0..12).map(|i| format!("line {i}\r\n")).collect();
        let out = TextCarrier::parse(long.as_bytes())
            .unwrap()
            .embed(b"ab")
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        for (i, line) in out.split_inclusive('\n').enumerate() {
            assert!(line.starts_with(&format!("line {i}")));
            assert!(line.ends_with("\r\n"));
        }
    }

    #[test]
    fn should_replace_an_earlier_pattern() {
        let carrier = TextCarrier::parse(&text_bytes(30)).unwrap();
        let once = carrier.embed(b"old").unwrap();
        let twice = TextCarrier::parse(&once)
            .unwrap()
            .embed(b"newer")
            .unwrap();

        assert_eq!(
            TextCarrier::parse(&twice).unwrap().extract().unwrap(),
            b"newer"
        );
    }

    #[test]
    fn should_report_no_hidden_data_for_plain_text() {
        let carrier = TextCarrier::parse(&text_bytes(20)).unwrap();

        assert!(matches!(
            carrier.extract(),
            Err(VeilError::NoHiddenDataFound)
        ));
    }

    #[test]
    fn should_refuse_invalid_utf8() {
        assert!(matches!(
            TextCarrier::parse(&[0x66, 0xff, 0x0a]),
            Err(VeilError::InvalidCarrier { .. })
        ));
    }
}
