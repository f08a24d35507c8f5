//! Self-contained PNG encoder - the raster contract of record.
//!
//! Layout: signature, IHDR, a single IDAT, IEND. No ancillary chunks, so
//! the output only depends on the pixels and the fixed zlib level.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

use crate::error::RenderError;
use crate::render::Raster;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// zlib level used for IDAT.
pub const COMPRESSION_LEVEL: u32 = 9;

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGB: u8 = 2;

/// Encodes a finished raster into image bytes.
///
/// Implementations must emit identical pixels; only the built-in encoder
/// guarantees identical bytes across runs and versions.
pub trait RasterEncoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn encode(&self, raster: &Raster) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPngEncoder;

impl RasterEncoder for BuiltinPngEncoder {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn encode(&self, raster: &Raster) -> Result<Vec<u8>, RenderError> {
        let mut ihdr = Vec::with_capacity(13);
        ihdr.extend_from_slice(&raster.width().to_be_bytes());
        ihdr.extend_from_slice(&raster.height().to_be_bytes());
        // depth, colour type, compression, filter, interlace
        ihdr.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGB, 0, 0, 0]);

        let idat = zlib_compress(&raster.filtered_scanlines())?;

        let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + 3 * 12 + ihdr.len() + idat.len());
        out.extend_from_slice(&PNG_SIGNATURE);
        write_chunk(&mut out, b"IHDR", &ihdr)?;
        write_chunk(&mut out, b"IDAT", &idat)?;
        write_chunk(&mut out, b"IEND", &[])?;
        Ok(out)
    }
}

fn zlib_compress(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    encoder
        .write_all(data)
        .map_err(|e| RenderError::Encoding(format!("zlib write: {e}")))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encoding(format!("zlib finish: {e}")))
}

/// Length, type, data, CRC-32 over type + data.
fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) -> Result<(), RenderError> {
    let len = u32::try_from(data.len())
        .map_err(|_| RenderError::Encoding(format!("chunk too large: {} bytes", data.len())))?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);

    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
    Ok(())
}
