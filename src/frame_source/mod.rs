//! FrameSource - Camera Frame Acquisition
//!
//! ## Responsibilities
//!
//! - Blocking pull of raw frames from a capture device
//! - Explicit acquire/release frame lifecycle
//! - End-of-stream signalling
//!
//! The detection loop only ever sees the [`FrameSource`] trait; the V4L2
//! implementation below is what a deployed gate camera uses.

use crate::error::{Error, Result};

/// Pixel layout of a raw frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// JPEG-compressed frame (typical V4L2 webcam stream)
    Mjpeg,
    /// Y plane followed by interleaved UV, 4:2:0
    Nv12,
    /// Interleaved Y0 U Y1 V, 4:2:2
    Yuyv,
    /// Single luminance plane
    Gray,
}

/// A raw video frame pulled from a source
///
/// Frames must be handed back via [`FrameSource::return_frame`] once
/// processing is done, matching the acquire/release contract of buffered
/// capture backends.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Frame bytes in `format` layout
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout of `data`
    pub format: FrameFormat,
}

/// Provider of sequential camera frames
pub trait FrameSource {
    /// Pull the next frame, blocking up to one frame interval
    ///
    /// Returns `Ok(None)` on end-of-stream. Any error is fatal to the
    /// caller's loop; there is no transient-failure retry at this boundary.
    fn next_frame(&mut self) -> Result<Option<RawFrame>>;

    /// Release a previously acquired frame back to the source
    fn return_frame(&mut self, frame: RawFrame);
}

/// V4L2 frame source over an MJPEG capture stream
pub struct V4lFrameSource {
    camera: rscam::Camera,
}

impl V4lFrameSource {
    /// Open a capture device and start streaming
    pub fn open(device: &str, width: u32, height: u32, fps: u32) -> Result<Self> {
        let mut camera = rscam::new(device)
            .map_err(|e| Error::Frame(format!("failed to open {device}: {e}")))?;

        camera
            .start(&rscam::Config {
                interval: (1, fps),
                resolution: (width, height),
                format: b"MJPG",
                ..Default::default()
            })
            .map_err(|e| Error::Frame(format!("failed to start capture on {device}: {e}")))?;

        tracing::info!(
            device = %device,
            width = width,
            height = height,
            fps = fps,
            "Capture stream started"
        );

        Ok(Self { camera })
    }
}

impl FrameSource for V4lFrameSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        let frame = self
            .camera
            .capture()
            .map_err(|e| Error::Frame(format!("capture failed: {e}")))?;

        let (width, height) = frame.resolution;
        Ok(Some(RawFrame {
            data: frame.to_vec(),
            width,
            height,
            format: FrameFormat::Mjpeg,
        }))
    }

    fn return_frame(&mut self, frame: RawFrame) {
        // The driver buffer was already requeued when rscam::Frame dropped;
        // releasing our owned copy completes the lifecycle.
        drop(frame);
    }
}
