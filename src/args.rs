use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_DATA_DIR, DEFAULT_REPORTS_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "agentwatch",
    about = "Calculate managed-agent availability per domain and operating system",
    version,
    long_about = None
)]
pub struct Args {
    /// Directory holding the persistent baseline database
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory where generated reports are written
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
