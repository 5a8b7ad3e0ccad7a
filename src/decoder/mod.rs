//! SymbolDecoder - QR Symbol Extraction
//!
//! ## Responsibilities
//!
//! - Locate and decode QR symbols in an enhanced luminance image
//! - Report decoded payloads with their corner geometry
//!
//! Per-symbol decode failures (a located grid that will not read) are
//! skipped; a frame only fails as a whole if the decoder itself errors.

use crate::error::Result;
use image::GrayImage;

/// Symbol families the scanner recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFormat {
    /// QR code
    Qr,
}

impl std::fmt::Display for SymbolFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolFormat::Qr => write!(f, "QRCode"),
        }
    }
}

/// A decoded symbol from a single frame
///
/// Ephemeral: consumed by the upload client within the same iteration.
#[derive(Debug, Clone)]
pub struct DecodedSymbol {
    /// Decoded text payload
    pub text: String,
    /// Symbol family
    pub format: SymbolFormat,
    /// Corner polygon in image coordinates, when the decoder reports one
    pub corners: Option<[(i32, i32); 4]>,
}

/// Decoder of luminance images into symbols
pub trait SymbolDecoder {
    /// Decode all symbols in the image, in detection order
    fn decode(&self, image: &GrayImage) -> Result<Vec<DecodedSymbol>>;
}

/// QR decoder backed by `rqrr`
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDecoder {
    fn decode(&self, image: &GrayImage) -> Result<Vec<DecodedSymbol>> {
        let (w, h) = image.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            w as usize,
            h as usize,
            |x, y| image.get_pixel(x as u32, y as u32)[0],
        );

        let mut symbols = Vec::new();
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_, content)) => {
                    let corners = grid.bounds.map(|p| (p.x, p.y));
                    symbols.push(DecodedSymbol {
                        text: content,
                        format: SymbolFormat::Qr,
                        corners: Some(corners),
                    });
                }
                Err(e) => {
                    // A located grid that fails to read is common under
                    // motion blur; keep going with the other grids.
                    tracing::debug!(error = %e, "Grid located but not decodable");
                }
            }
        }
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_image_decodes_to_nothing() {
        let image = GrayImage::from_pixel(64, 64, image::Luma([255u8]));
        let symbols = QrDecoder::new().decode(&image).unwrap();
        assert!(symbols.is_empty());
    }

    #[test]
    fn noise_image_decodes_to_nothing() {
        let image = GrayImage::from_fn(64, 64, |x, y| {
            image::Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
        });
        let symbols = QrDecoder::new().decode(&image).unwrap();
        assert!(symbols.is_empty());
    }
}
