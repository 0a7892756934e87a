//! Command-line interface for subwire
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// On-demand subtitle streaming over WebSocket
#[derive(Parser, Debug)]
#[command(
    name = "subwire",
    version,
    about = "On-demand subtitle streaming over WebSocket"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: session events, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the subtitle relay server
    Serve {
        /// Listen address (default from config, e.g. 127.0.0.1:8765)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Connect to a running server and print the session transcript
    Probe {
        /// Server URL
        #[arg(long, value_name = "URL", default_value = "ws://127.0.0.1:8765")]
        url: String,

        /// Asset identifier to transcribe
        uuid: String,

        /// Source language code
        #[arg(long, value_name = "LANG", default_value = "en-US")]
        source_locale: String,

        /// Target language code
        #[arg(long, value_name = "LANG", default_value = "en-US")]
        target_locale: String,

        /// Subtitle format (webvtt, srt, ttmlv2, passthrough)
        #[arg(long, short = 'f', value_name = "FORMAT")]
        format: Option<String>,

        /// Send stop_transcription after this many subtitles
        #[arg(long, value_name = "N")]
        stop_after: Option<u64>,
    },
}
