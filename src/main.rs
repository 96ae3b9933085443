use anyhow::Result;
use clap::Parser;
use tracing::error;

use agentwatch::menu::App;
use agentwatch::utils::setup_logging;
use agentwatch::{AppConfig, Args};

fn run(config: AppConfig) -> Result<()> {
    let mut app = App::new(config)?;
    app.run()
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = AppConfig::new(args.data_dir, args.reports_dir);

    if let Err(err) = run(config) {
        error!(error = %err, "Fatal error");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
