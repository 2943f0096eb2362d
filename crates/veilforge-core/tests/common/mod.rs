#![allow(dead_code)]

use std::io::{Cursor, Write};

use hound::{SampleFormat, WavSpec, WavWriter};
use image::{ImageBuffer, ImageFormat, RgbaImage};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use veilforge_core::{CipherMode, CipherOptions, EngineOptions, KdfParams};

pub fn fast_options() -> EngineOptions {
    EngineOptions::default().with_cipher(CipherOptions::new(
        CipherMode::Aead,
        KdfParams::new(256, 1, 1),
    ))
}

pub fn noise_image(width: u32, height: u32) -> RgbaImage {
    let mut state = 0x1234_5678_u32;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };

    ImageBuffer::from_fn(width, height, |_, _| {
        image::Rgba([next(), next(), next(), 255])
    })
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    noise_image(width, height)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode png");
    out.into_inner()
}

pub fn bmp(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    noise_image(width, height)
        .write_to(&mut out, ImageFormat::Bmp)
        .expect("Failed to encode bmp");
    out.into_inner()
}

/// 16 bit stereo at 8 kHz
pub fn wav(frames: usize) -> Vec<u8> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut out = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut out, spec).expect("Failed to create wav writer");
        for f in 0..frames {
            let t = f as f64 / 8000.0;
            for freq in [440.0, 660.0] {
                let s = (7000.0 * (2.0 * std::f64::consts::PI * freq * t).sin()).round() as i16;
                writer.write_sample(s).expect("Failed to write sample");
            }
        }
        writer.finalize().expect("Failed to finish wav");
    }

    out.into_inner()
}

pub fn y4m(width: usize, height: usize, frames: usize) -> Vec<u8> {
    let mut bytes = format!("YUV4MPEG2 W{width} H{height} F30:1 Ip C420jpeg\n").into_bytes();
    let chroma = 2 * width.div_ceil(2) * height.div_ceil(2);
    for frame in 0..frames {
        bytes.extend_from_slice(b"FRAME\n");
        bytes.extend((0..width * height).map(|i| ((i * 3 + frame) % 256) as u8));
        bytes.extend(std::iter::repeat(128u8).take(chroma));
    }

    bytes
}

pub fn mp4() -> Vec<u8> {
    let mut bytes = Vec::new();
    for (kind, body) in [
        (b"ftyp", b"mp42\x00\x00\x00\x00mp42isom".to_vec()),
        (b"moov", vec![0u8; 24]),
        (b"mdat", (0u8..64).collect()),
    ] {
        bytes.extend_from_slice(&(8 + body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(kind);
        bytes.extend_from_slice(&body);
    }

    bytes
}

pub fn pdf() -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>",
        "<< /Type /Pages /Kids [] /Count 0 >>",
        "<< /Producer (hand written) >>",
    ];
    let mut bytes = b"%PDF-1.7\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(bytes.len());
        bytes.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref = bytes.len();
    bytes.extend_from_slice(b"xref\n0 4\n0000000000 65535 f \n");
    for offset in offsets {
        bytes.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    bytes.extend_from_slice(
        format!("trailer\n<< /Size 4 /Root 1 0 R /Info 3 0 R >>\nstartxref\n{xref}\n%%EOF\n")
            .as_bytes(),
    );

    bytes
}

pub fn docx() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in [
        ("[Content_Types].xml", "<Types/>"),
        ("word/document.xml", "<w:document>quarterly numbers</w:document>"),
    ] {
        writer.start_file(name, options).expect("Failed to start entry");
        writer
            .write_all(content.as_bytes())
            .expect("Failed to write entry");
    }

    writer.finish().expect("Failed to finish zip").into_inner()
}

pub fn text(lines: usize) -> Vec<u8> {
    (0..lines)
        .map(|i| format!("{i}. a line of plain prose\n"))
        .collect::<String>()
        .into_bytes()
}
