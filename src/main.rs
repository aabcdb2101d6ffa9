use anyhow::Result;
use clap::Parser;
use tracing::error;

use supplement_scout_lib::cli::{self, Cli};
use supplement_scout_lib::infrastructure::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().await?;

    logging::init_logging_with_config(config.logging.clone())?;
    logging::log_system_info();

    match cli::run(&cli, &config).await {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(e) => {
            error!("Search failed: {:#}", e);
            Err(e)
        }
    }
}
