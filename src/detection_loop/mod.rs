//! DetectionLoop - Sequential Scan Pipeline
//!
//! ## Responsibilities
//!
//! - Periodic frame polling from the [`FrameSource`]
//! - Debounce suppression between accepted detections
//! - Enhance + decode + validate + notify sequencing
//! - Clean drain on end-of-stream
//!
//! One tokio task drives everything; within a tick the stages run strictly
//! in order, so frames process in acquisition order and symbols in decoder
//! order. A slow upload blocks the next tick, which is acceptable because
//! the debounce window already limits throughput to one scan per window.

use crate::config::AppConfig;
use crate::debounce::DebounceGate;
use crate::decoder::SymbolDecoder;
use crate::enhancer;
use crate::error::Result;
use crate::frame_source::FrameSource;
use crate::notifier::NotificationEmitter;
use crate::upload_client::{UploadClient, ValidationRequest};
use std::time::Duration;
use tokio::time::Instant;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Inside the debounce window; the frame source was not touched
    Suppressed,
    /// Frame acquired but enhancement or decoding failed; frame released
    Skipped,
    /// Frame processed, no symbols found
    NoDetection,
    /// Frame yielded this many symbols, all validated and notified
    Detected(usize),
    /// Frame source is drained; the loop is done
    EndOfStream,
}

/// Sequential detection pipeline
pub struct DetectionLoop<S, D, N> {
    source: S,
    decoder: D,
    uploader: UploadClient,
    notifier: N,
    location: String,
    entrance: String,
    debounce: DebounceGate,
    poll_interval: Duration,
}

impl<S, D, N> DetectionLoop<S, D, N>
where
    S: FrameSource,
    D: SymbolDecoder,
    N: NotificationEmitter,
{
    /// Assemble the pipeline
    pub fn new(source: S, decoder: D, uploader: UploadClient, notifier: N, config: &AppConfig) -> Self {
        Self {
            source,
            decoder,
            uploader,
            notifier,
            location: config.location.clone(),
            entrance: config.entrance.clone(),
            debounce: DebounceGate::new(config.debounce_window),
            poll_interval: config.poll_interval,
        }
    }

    /// Run until the frame source drains or fails
    ///
    /// An acquisition failure that is not end-of-stream is fatal and
    /// propagates; there is no automatic restart.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            debounce_ms = self.debounce.window().as_millis() as u64,
            "Detection loop started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            if self.tick().await? == TickOutcome::EndOfStream {
                break;
            }
        }

        tracing::info!("Detection loop drained");
        Ok(())
    }

    /// One pass of the pipeline
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        // Suppressed ticks skip acquisition entirely; the capture backend
        // keeps rotating its own buffers while we stay away.
        if !self.debounce.poll(Instant::now()) {
            return Ok(TickOutcome::Suppressed);
        }

        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!("No more frames available, draining");
                return Ok(TickOutcome::EndOfStream);
            }
            Err(e) => {
                tracing::error!(error = %e, "Frame acquisition failed");
                return Err(e);
            }
        };

        let image = match enhancer::enhance(&frame) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "Enhancement failed, skipping frame");
                self.source.return_frame(frame);
                return Ok(TickOutcome::Skipped);
            }
        };

        let symbols = match self.decoder.decode(&image) {
            Ok(symbols) => symbols,
            Err(e) => {
                tracing::warn!(error = %e, "Decode failed, skipping frame");
                self.source.return_frame(frame);
                return Ok(TickOutcome::Skipped);
            }
        };

        if symbols.is_empty() {
            self.source.return_frame(frame);
            return Ok(TickOutcome::NoDetection);
        }

        for symbol in &symbols {
            tracing::info!(format = %symbol.format, payload = %symbol.text, "Symbol decoded");

            let outcome = self
                .uploader
                .validate(&ValidationRequest {
                    payload: symbol.text.clone(),
                    location: self.location.clone(),
                    entrance: self.entrance.clone(),
                })
                .await;

            self.notifier.emit(outcome);
        }

        // One window per frame, armed after the last symbol's notification
        self.debounce.arm(Instant::now());
        self.source.return_frame(frame);

        Ok(TickOutcome::Detected(symbols.len()))
    }

    /// Whether the loop is inside its suppression window
    pub fn is_suppressed(&self) -> bool {
        self.debounce.is_suppressed()
    }
}
