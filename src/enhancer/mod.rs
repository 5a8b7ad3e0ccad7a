//! ImageEnhancer - Decoder-Ready Image Preparation
//!
//! ## Responsibilities
//!
//! - Luminance conversion from the raw frame format
//! - Region-of-interest crop (center of frame, where the scan target sits)
//! - Contrast / denoise / sharpen chain
//! - Binarization for the symbol decoder
//!
//! The whole chain is a pure function: same frame in, same image out, with
//! no side effects. The detection loop relies on this when it skips a frame
//! after an enhancement failure.

use crate::error::{Error, Result};
use crate::frame_source::{FrameFormat, RawFrame};
use image::imageops::{self, FilterType};
use image::GrayImage;

/// Convert a raw frame to a single luminance plane
fn to_luma(frame: &RawFrame) -> Result<GrayImage> {
    let (w, h) = (frame.width, frame.height);
    match frame.format {
        FrameFormat::Mjpeg => Ok(image::load_from_memory(&frame.data)?.to_luma8()),
        FrameFormat::Nv12 => {
            // Y plane is the first w*h bytes
            let plane = (w * h) as usize;
            if frame.data.len() < plane {
                return Err(Error::Frame(format!(
                    "NV12 frame too short: {} bytes for {w}x{h}",
                    frame.data.len()
                )));
            }
            GrayImage::from_raw(w, h, frame.data[..plane].to_vec())
                .ok_or_else(|| Error::Internal("NV12 luma plane construction failed".into()))
        }
        FrameFormat::Yuyv => {
            let expected = (w * h * 2) as usize;
            if frame.data.len() < expected {
                return Err(Error::Frame(format!(
                    "YUYV frame too short: {} bytes for {w}x{h}",
                    frame.data.len()
                )));
            }
            let luma: Vec<u8> = frame.data.iter().step_by(2).copied().collect();
            GrayImage::from_raw(w, h, luma)
                .ok_or_else(|| Error::Internal("YUYV luma plane construction failed".into()))
        }
        FrameFormat::Gray => {
            let plane = (w * h) as usize;
            if frame.data.len() < plane {
                return Err(Error::Frame(format!(
                    "gray frame too short: {} bytes for {w}x{h}",
                    frame.data.len()
                )));
            }
            GrayImage::from_raw(w, h, frame.data[..plane].to_vec())
                .ok_or_else(|| Error::Internal("gray plane construction failed".into()))
        }
    }
}

/// Produce a decoder-ready luminance image from a raw frame
///
/// The chain mirrors what works for gate-mounted cameras: crop to the
/// center quarter where the pass is presented, equalize contrast, enlarge
/// 2x with a cubic filter, median-denoise, unsharp-mask, then adaptive
/// threshold and a morphological close to heal broken module edges.
pub fn enhance(frame: &RawFrame) -> Result<GrayImage> {
    let gray = to_luma(frame)?;
    let (w, h) = gray.dimensions();
    if w < 8 || h < 8 {
        return Err(Error::Frame(format!("frame too small to enhance: {w}x{h}")));
    }

    // Center ROI: the middle quarter of the frame
    let roi = imageops::crop_imm(&gray, w * 3 / 8, h * 3 / 8, w / 4, h / 4).to_image();

    let equalized = imageproc::contrast::equalize_histogram(&roi);

    let (rw, rh) = equalized.dimensions();
    let resized = imageops::resize(&equalized, rw * 2, rh * 2, FilterType::CatmullRom);

    let denoised = imageproc::filter::median_filter(&resized, 1, 1);

    let sharpened = imageproc::filter::sharpen_gaussian(&denoised, 1.0, 0.5);

    let binary = imageproc::contrast::adaptive_threshold(&sharpened, 12);

    Ok(imageproc::morphology::close(
        &binary,
        imageproc::distance_transform::Norm::LInf,
        1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> RawFrame {
        let data: Vec<u8> = (0..width * height)
            .map(|i| ((i * 7) % 251) as u8)
            .collect();
        RawFrame {
            data,
            width,
            height,
            format: FrameFormat::Gray,
        }
    }

    #[test]
    fn deterministic_for_same_input() {
        let frame = gradient_frame(160, 120);
        let a = enhance(&frame).unwrap();
        let b = enhance(&frame).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn output_geometry_is_double_the_roi() {
        let frame = gradient_frame(160, 120);
        let out = enhance(&frame).unwrap();
        // ROI is a quarter of each dimension, then scaled 2x
        assert_eq!(out.dimensions(), (80, 60));
    }

    #[test]
    fn output_is_binary() {
        let frame = gradient_frame(160, 120);
        let out = enhance(&frame).unwrap();
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn truncated_nv12_frame_is_rejected() {
        let frame = RawFrame {
            data: vec![0u8; 100],
            width: 64,
            height: 64,
            format: FrameFormat::Nv12,
        };
        assert!(enhance(&frame).is_err());
    }

    #[test]
    fn yuyv_luma_extraction_takes_even_bytes() {
        let mut data = vec![0u8; 16 * 16 * 2];
        for (i, b) in data.iter_mut().enumerate() {
            *b = if i % 2 == 0 { 200 } else { 10 };
        }
        let frame = RawFrame {
            data,
            width: 16,
            height: 16,
            format: FrameFormat::Yuyv,
        };
        let luma = to_luma(&frame).unwrap();
        assert!(luma.pixels().all(|p| p[0] == 200));
    }
}
