//! PNG encoding delegated to the `png` crate.
//!
//! Pixels match [`BuiltinPngEncoder`](super::BuiltinPngEncoder); bytes may
//! not, since the crate owns its deflate stream. Best-effort only.

use crate::error::RenderError;
use crate::render::{Raster, RasterEncoder};

#[derive(Debug, Clone, Copy, Default)]
pub struct DelegatedPngEncoder;

impl RasterEncoder for DelegatedPngEncoder {
    fn name(&self) -> &'static str {
        "png-crate"
    }

    fn encode(&self, raster: &Raster) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, raster.width(), raster.height());
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(png::Compression::Best);
            encoder.set_filter(png::FilterType::NoFilter);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RenderError::Encoding(format!("png header: {e}")))?;
            writer
                .write_image_data(raster.pixels())
                .map_err(|e| RenderError::Encoding(format!("png data: {e}")))?;
            writer
                .finish()
                .map_err(|e| RenderError::Encoding(format!("png finish: {e}")))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BuiltinPngEncoder, Rgb};

    fn decode(bytes: &[u8]) -> Vec<u8> {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        buf
    }

    #[test]
    fn test_same_pixels_as_builtin() {
        let mut raster = Raster::new(16, 9, Rgb::WHITE).unwrap();
        raster.draw_line(0, 8, 15, 0, Rgb::BLACK);
        let builtin = BuiltinPngEncoder.encode(&raster).unwrap();
        let delegated = DelegatedPngEncoder.encode(&raster).unwrap();
        assert_eq!(decode(&builtin), decode(&delegated));
        assert_eq!(decode(&delegated), raster.pixels());
    }
}
