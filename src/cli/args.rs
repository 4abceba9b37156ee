// ABOUTME: Command line argument definitions for the geoflow service
// ABOUTME: Declares clap options that override values from the config file

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "geoflow",
    version,
    about = "Geospatial analysis workflow service"
)]
pub struct Args {
    /// Path to the service configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP listener (overrides config)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Directory containing workflow definition files (overrides config)
    #[arg(short, long)]
    pub workflows_dir: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
