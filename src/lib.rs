//! gatescan - QR pass check-in scanner for gate cameras
//!
//! ## Architecture
//!
//! 1. FrameSource - camera frame acquisition (V4L2 MJPEG)
//! 2. ImageEnhancer - pure decoder-ready image preparation
//! 3. SymbolDecoder - QR symbol extraction
//! 4. UploadClient - pass validation and outcome classification
//! 5. ScanEventChannel - stateful scan notifications
//! 6. DetectionLoop - sequential pipeline with debounce suppression
//!
//! ## Design Principles
//!
//! - Single task: all stages run sequentially inside one loop tick
//! - Trait seams at the device boundaries (source, decoder, notifier)
//! - Failures classify, they do not propagate: only startup misconfiguration
//!   and frame-acquisition errors stop the process

pub mod config;
pub mod debounce;
pub mod decoder;
pub mod detection_loop;
pub mod enhancer;
pub mod error;
pub mod frame_source;
pub mod notifier;
pub mod upload_client;

pub use error::{Error, Result};
