//! Command-line arguments.
//!
//! BeeRef is a GUI application; the command line only selects a file to
//! open at startup and the session log verbosity:
//!
//!   beeref board.bee
//!   beeref --loglevel debug

use std::path::PathBuf;

use clap::Parser;

/// BeeRef reference image viewer.
#[derive(Parser, Debug)]
#[command(
    name = "beeref",
    about = "Collect and arrange reference images on an infinite canvas",
    version
)]
pub struct CommandlineArgs {
    /// A .bee file to open on startup.
    #[arg(value_name = "FILE.bee")]
    pub filename: Option<PathBuf>,

    /// Minimum session-log level: debug, info, warn, error.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub loglevel: String,
}
