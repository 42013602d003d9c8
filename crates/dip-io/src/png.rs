//! PNG codec
//!
//! ## Overview
//!
//! Decodes 8- and 16-bit grayscale and color PNGs into [`Image`] buffers and
//! encodes buffers back out as 8-bit PNGs. 16-bit samples are scaled onto the
//! working range by `/257`, alpha channels are dropped on read, and palette
//! images are rejected rather than expanded. Writing quantizes either by
//! clamp-and-round or, with `rescale`, by mapping the buffer's full range
//! onto `[0, MAX_LEVEL]` first.
//!
//! # Example
//!
//! ```rust,ignore
//! use dip_io::png::{read, write};
//!
//! let image = read("input.png")?;
//! write("output.png", &image, false)?;
//! ```

use crate::error::{IoError, IoResult};
use dip_core::{Image, MAX_LEVEL};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::debug;

/// Reads a PNG file into a 1- or 3-channel buffer.
///
/// Grayscale and grayscale-alpha files decode to 1 channel, RGB and RGBA to
/// 3; the alpha plane is discarded. 16-bit samples land on `[0, 255]` via
/// `/257`. Palette files and exotic bit depths are
/// [`IoError::UnsupportedFormat`].
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    // palette data must surface as Indexed so it can be rejected,
    // not silently expanded
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let rows = info.height as usize;
    let cols = info.width as usize;
    let bytes = &buf[..info.buffer_size()];

    let (channels, samples): (usize, Vec<f32>) = match (info.color_type, info.bit_depth) {
        (png::ColorType::Grayscale, png::BitDepth::Eight) => {
            (1, bytes.iter().map(|&v| v as f32).collect())
        }
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => (
            1,
            bytes_to_u16(bytes)
                .into_iter()
                .map(|v| v as f32 / 257.0)
                .collect(),
        ),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => {
            (1, bytes.chunks(2).map(|ga| ga[0] as f32).collect())
        }
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Sixteen) => (
            1,
            bytes_to_u16(bytes)
                .chunks(2)
                .map(|ga| ga[0] as f32 / 257.0)
                .collect(),
        ),
        (png::ColorType::Rgb, png::BitDepth::Eight) => {
            (3, bytes.iter().map(|&v| v as f32).collect())
        }
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => (
            3,
            bytes_to_u16(bytes)
                .into_iter()
                .map(|v| v as f32 / 257.0)
                .collect(),
        ),
        (png::ColorType::Rgba, png::BitDepth::Eight) => (
            3,
            bytes
                .chunks(4)
                .flat_map(|px| [px[0] as f32, px[1] as f32, px[2] as f32])
                .collect(),
        ),
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => (
            3,
            bytes_to_u16(bytes)
                .chunks(4)
                .flat_map(|px| {
                    [
                        px[0] as f32 / 257.0,
                        px[1] as f32 / 257.0,
                        px[2] as f32 / 257.0,
                    ]
                })
                .collect(),
        ),
        (color_type, bit_depth) => {
            return Err(IoError::UnsupportedFormat(format!(
                "{color_type:?} at {bit_depth:?}"
            )));
        }
    };
    debug!(rows, cols, channels, path = %path.display(), "png read");
    Ok(Image::from_data(rows, cols, channels, samples)?)
}

/// Writes a 1- or 3-channel buffer as an 8-bit PNG.
///
/// With `rescale` the buffer's `[min, max]` is mapped linearly onto
/// `[0, MAX_LEVEL]` before quantization (a constant buffer maps to 0);
/// without it samples are clamped to the range and rounded.
pub fn write<P: AsRef<Path>>(path: P, img: &Image, rescale: bool) -> IoResult<()> {
    let path = path.as_ref();
    let color_type = match img.channels() {
        1 => png::ColorType::Grayscale,
        3 => png::ColorType::Rgb,
        n => {
            return Err(IoError::EncodeError(format!(
                "unsupported channel count: {n}"
            )));
        }
    };
    let staged;
    let source = if rescale {
        staged = img.rescaled(0.0, MAX_LEVEL);
        &staged
    } else {
        img
    };
    let bytes: Vec<u8> = source
        .data()
        .iter()
        .map(|&v| v.clamp(0.0, MAX_LEVEL).round() as u8)
        .collect();
    debug!(
        rows = img.rows(),
        cols = img.cols(),
        channels = img.channels(),
        rescale,
        path = %path.display(),
        "png write"
    );
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, img.cols() as u32, img.rows() as u32);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());
    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .write_image_data(&bytes)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(())
}

/// Converts a big-endian byte slice to a u16 vector.
fn bytes_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}
