//! Command-line interface for Stargate vault balances, previews and
//! transactions.

use stargate_vault::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (ctx, command) = cli::CliEnv::parse_and_convert()?;
    cli::init_tracing(&ctx, &command)?;

    cli::run_command(ctx, command).await?;
    Ok(())
}
