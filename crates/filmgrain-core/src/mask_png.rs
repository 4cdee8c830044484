//! Mask artifacts on disk.
//!
//! Masks are stored as 8-bit PNG with fixed fast-compression settings:
//! lossless, cheap to read and write, and byte-stable for a given mask.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Decoder, Encoder, FilterType};
use thiserror::Error;

use crate::mask::{GrainMask, MaskKind};

/// Errors from mask artifact IO.
#[derive(Debug, Error)]
pub enum MaskPngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("malformed mask artifact: {0}")]
    Malformed(String),
}

/// Write a mask to a PNG file.
pub fn write_mask(path: &Path, mask: &GrainMask) -> Result<(), MaskPngError> {
    let file = File::create(path)?;
    write_mask_to_writer(mask, BufWriter::new(file))
}

/// Write a mask to any writer.
pub fn write_mask_to_writer<W: Write>(mask: &GrainMask, writer: W) -> Result<(), MaskPngError> {
    let mut encoder = Encoder::new(writer, mask.width(), mask.height());
    encoder.set_color(match mask.kind() {
        MaskKind::Gray => ColorType::Grayscale,
        MaskKind::Rgb => ColorType::Rgb,
    });
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(Compression::Fast);
    encoder.set_filter(FilterType::NoFilter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(mask.data())?;
    Ok(())
}

/// Read a mask back from a PNG file.
pub fn read_mask(path: &Path) -> Result<GrainMask, MaskPngError> {
    let file = File::open(path)?;
    read_mask_from_reader(BufReader::new(file))
}

/// Read a mask from any reader.
pub fn read_mask_from_reader<R: Read>(reader: R) -> Result<GrainMask, MaskPngError> {
    let decoder = Decoder::new(reader);
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let kind = match (info.color_type, info.bit_depth) {
        (ColorType::Grayscale, BitDepth::Eight) => MaskKind::Gray,
        (ColorType::Rgb, BitDepth::Eight) => MaskKind::Rgb,
        (color, depth) => {
            return Err(MaskPngError::Malformed(format!(
                "unsupported color type {color:?} at bit depth {depth:?}"
            )));
        }
    };

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    buf.truncate(frame.buffer_size());

    let expected = width as usize * height as usize * kind.channels();
    if buf.len() != expected {
        return Err(MaskPngError::Malformed(format!(
            "expected {expected} bytes for {width}x{height}, got {}",
            buf.len()
        )));
    }

    Ok(GrainMask::from_raw(width, height, kind, buf))
}
