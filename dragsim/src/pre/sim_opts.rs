use crate::core::scheduler::{check_frame_rate, check_realtime_factor};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "DRAGSIM",
    about = "A two-lane drag race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Activate GUI - race will be shown in real-time with visualization
    #[clap(short, long)]
    pub gui: bool,

    /// Only predict the outcome of the race without animating it
    #[clap(short, long)]
    pub instant: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the race parameter file (OPTIONAL: if not set, uses a hardcoded 2-car race)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set frame rate of the animation loop in Hz (1 to 1000)
    #[clap(short, long, default_value = "60.0")]
    pub frame_rate: f64,

    /// Set real-time factor (0.01 to 100, only relevant in GUI mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Export the final frame of the race as PNG to the given path (GUI and non-GUI mode)
    #[clap(short, long)]
    pub export_png: Option<PathBuf>,

    /// Write the race result as JSON to the given path
    #[clap(long)]
    pub result_path: Option<PathBuf>,
}

impl SimOpts {
    /// check rejects option values the schedulers cannot run with.
    pub fn check(&self) -> anyhow::Result<()> {
        check_frame_rate(self.frame_rate).context("Invalid option --frame-rate!")?;
        check_realtime_factor(self.realtime_factor).context("Invalid option --realtime-factor!")?;
        Ok(())
    }
}
