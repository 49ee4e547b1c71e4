//! Command-line argument definitions.

use camlisten_core::constants::CONFIG_PATH_ENV;
use clap::Parser;
use std::path::PathBuf;

/// Listen to network cameras and print their events.
#[derive(Parser, Debug)]
#[command(name = "camlisten")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Only listen to the camera with this name (case-insensitive)
    #[arg(value_name = "CAMERA")]
    pub camera: Option<String>,

    /// Camera list file
    #[arg(short, long, value_name = "PATH", env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Print event index and JSON data
    #[arg(short, long)]
    pub verbose: bool,
}
