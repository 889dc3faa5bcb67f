//! Gzip envelope handling for tileset documents.
//!
//! Tilesets are often served pre-compressed. Whether a document is compressed
//! is decided purely by inspecting its first two bytes, never by its file
//! extension.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// Gzip magic number.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression state of a tileset document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain JSON.
    #[default]
    None,
    /// Gzip-wrapped JSON.
    Gzip,
}

impl Compression {
    /// Detect the compression state of a buffer.
    pub fn detect(data: &[u8]) -> Self {
        if is_compressed(data) {
            Compression::Gzip
        } else {
            Compression::None
        }
    }

    /// Apply this compression state to serialized document bytes.
    pub fn apply(self, data: Vec<u8>) -> io::Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data),
            Compression::Gzip => encode(&data),
        }
    }
}

/// Returns true if the buffer starts with the gzip magic number.
///
/// Only the two magic bytes are checked; the rest of the envelope is not
/// validated.
pub fn is_compressed(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == GZIP_MAGIC
}

/// Remove the gzip envelope, or return the bytes unchanged when absent.
pub fn decode(data: &[u8]) -> io::Result<Vec<u8>> {
    if !is_compressed(data) {
        return Ok(data.to_vec());
    }

    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Wrap bytes in a gzip envelope.
pub fn encode(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
