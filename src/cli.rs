//! Command-line argument parsing with clap.
//!
//! Every flag is optional so that unset flags fall through to the config
//! file and then to the built-in defaults (see [`crate::config::Settings`]).

use clap::Parser;
use std::path::PathBuf;

use crate::camera::{FormatPolicy, SizePolicy};

/// Stream a V4L2 camera to the terminal as ASCII art
#[derive(Parser, Debug, Default)]
#[command(name = "cam2ascii")]
#[command(version, about = "Live ASCII video from a webcam", long_about = None)]
pub struct Args {
    /// Capture device path (default: /dev/video0)
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// ASCII grid width in characters (default: 320)
    #[arg(short = 'W', long)]
    pub width: Option<u16>,

    /// ASCII grid height in characters (default: 90)
    #[arg(short = 'H', long)]
    pub height: Option<u16>,

    /// Target display frames per second (default: 13)
    #[arg(short, long)]
    pub fps: Option<u32>,

    /// Seconds to wait for a frame before reporting a timeout (default: 5)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Pixel format: "first" or a fourcc such as MJPG or YUYV
    #[arg(long)]
    pub format: Option<FormatPolicy>,

    /// Frame size to negotiate
    #[arg(long, value_enum)]
    pub size: Option<SizePolicy>,

    /// Frames buffered for output before new ones are dropped (default: 2)
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}
