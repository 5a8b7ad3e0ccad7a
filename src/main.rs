//! gatescan - QR pass check-in scanner
//!
//! Main entry point: load configuration, open the camera, wire the
//! pipeline, run until the stream drains or a shutdown signal arrives.

use gatescan::{
    config::AppConfig, decoder::QrDecoder, detection_loop::DetectionLoop,
    frame_source::V4lFrameSource, notifier::ScanEventChannel, upload_client::UploadClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatescan=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting gatescan v{}", env!("CARGO_PKG_VERSION"));

    // Missing required parameters abort here; they are misconfiguration,
    // not transient conditions
    let config = AppConfig::from_env()?;
    tracing::info!(
        endpoint = %config.endpoint,
        location = %config.location,
        entrance = %config.entrance,
        method = ?config.upload_method,
        video_device = %config.video_device,
        "Configuration loaded"
    );

    let source = V4lFrameSource::open(
        &config.video_device,
        config.frame_width,
        config.frame_height,
        config.frame_rate,
    )?;

    let uploader = UploadClient::new(&config)?;
    let channel = ScanEventChannel::declare();

    let pipeline = DetectionLoop::new(source, QrDecoder::new(), uploader, channel.clone(), &config);

    tokio::select! {
        result = pipeline.run() => {
            if let Err(ref e) = result {
                tracing::error!(error = %e, "Detection loop stopped on fatal error");
            }
            channel.undeclare();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            channel.undeclare();
        }
    }

    Ok(())
}
