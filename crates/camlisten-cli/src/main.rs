//! camlisten CLI entry point.

mod args;
mod output;

use anyhow::{Context, Result};
use camlisten_core::config::CameraConfig;
use camlisten_network::{CameraClientConfig, CameraMonitor, MonitorConfig, MonitorEvent};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let path = CameraConfig::resolve_path(args.config.as_deref());
    let config = CameraConfig::from_file(&path)
        .with_context(|| format!("Failed to load camera list: {}", path.display()))?;
    let cameras = config.select(args.camera.as_deref())?;

    println!("Cameras:");
    for camera in &cameras {
        println!("  {}", camera.display_name());
    }

    let mut monitor = CameraMonitor::new(MonitorConfig::default(), CameraClientConfig::default())
        .context("Failed to create camera client")?;
    for camera in cameras {
        println!("Monitoring {}...", camera.display_name());
        monitor.register(camera);
    }

    let mut handle = monitor.start();
    println!("Press Ctrl-C to exit");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Interrupted");
                break;
            }
            event = handle.recv() => match event {
                Some(event @ MonitorEvent::Failure { .. }) => {
                    eprintln!("{}", output::render(&event, args.verbose));
                }
                Some(event) => println!("{}", output::render(&event, args.verbose)),
                None => {
                    if handle.is_cancelled() {
                        error!("Too many camera failures, stopping");
                    }
                    break;
                }
            },
        }
    }

    handle.shutdown().await;
    println!("\nExiting\n");
    Ok(())
}
