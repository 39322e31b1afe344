mod action;

use clap::Parser;
use turkey_pos_installments::{config, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = action::AppArgs::parse();
    logger::setup_simple_logger(config::APP_CONFIG.debug_logging(args.verbose))?;

    args.run().await
}
