mod cli;
mod config;
mod journal;
mod monitoring;
mod notify;
mod store;
mod validation;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_verbose(cli.verbose);

    let config = cli.load_config()?;
    cli::execute(cli.command.unwrap_or(Command::Run), config).await
}
