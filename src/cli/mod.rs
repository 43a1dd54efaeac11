//! CLI commands for balances, previews, vault writes and the
//! interactive panel.

mod vault;

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use clap::{Parser, Subcommand};
use stargate_evm::{ReadOnlyEvm, connect_http};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::amount::TokenAmount;
use crate::config::{Ctx, Env, setup_file_tracing, setup_tracing};
use crate::error::ChainCallError;
use crate::panel;
use crate::vault::{VaultActions, VaultClient, VaultQuery};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show token, share and reward balances
    Balances {
        /// Account to inspect (defaults to the configured signer)
        #[arg(long)]
        address: Option<Address>,
    },
    /// Preview the shares minted by a deposit
    PreviewDeposit {
        /// Amount of the underlying token (e.g., 40 or 12.5)
        #[arg(short = 'a', long)]
        amount: TokenAmount,
    },
    /// Preview the shares burned by a withdrawal
    PreviewWithdraw {
        /// Amount of the underlying token to withdraw
        #[arg(short = 'a', long)]
        amount: TokenAmount,
    },
    /// Approve a spender for the underlying token
    Approve {
        /// Allowance in underlying token units
        #[arg(short = 'a', long)]
        amount: TokenAmount,
        /// Spender (defaults to the wrapper contract)
        #[arg(long)]
        spender: Option<Address>,
    },
    /// Deposit the underlying token into the wrapper
    Deposit {
        /// Amount of the underlying token to deposit
        #[arg(short = 'a', long)]
        amount: TokenAmount,
    },
    /// Withdraw the underlying token from the wrapper
    Withdraw {
        /// Amount of the underlying token to withdraw
        #[arg(short = 'a', long)]
        amount: TokenAmount,
        /// Recipient (defaults to the configured signer)
        #[arg(long)]
        to: Option<Address>,
    },
    /// Claim accrued rewards
    Claim,
    /// Open the interactive deposit / withdraw / claim panel
    Panel {
        /// Write logs to this file; the panel owns the terminal
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "stargate-vault")]
#[command(about = "Deposit, withdraw and claim rewards from a Stargate USDC wrapper vault")]
#[command(version)]
pub struct CliEnv {
    #[clap(flatten)]
    env: Env,
    #[command(subcommand)]
    pub command: Commands,
}

impl CliEnv {
    /// Parse CLI arguments, load config from file, and return with subcommand.
    pub fn parse_and_convert() -> anyhow::Result<(Ctx, Commands)> {
        Self::parse().load()
    }

    /// Load config and secrets from the file paths parsed from CLI arguments.
    pub(crate) fn load(self) -> anyhow::Result<(Ctx, Commands)> {
        let ctx = Ctx::load_files(&self.env.config, &self.env.secrets)?;
        Ok((ctx, self.command))
    }
}

/// Installs the subscriber matching the command. The panel draws on
/// stdout, so it only logs when given a file.
pub fn init_tracing(ctx: &Ctx, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Panel {
            log_file: Some(path),
        } => setup_file_tracing(&ctx.log_level, std::fs::File::create(path)?),
        Commands::Panel { log_file: None } => {}
        _ => setup_tracing(&ctx.log_level),
    }

    Ok(())
}

/// Contract access for one invocation: reads always, writes only when a
/// private key is configured.
pub(crate) struct Session {
    query: Arc<dyn VaultQuery>,
    actions: Option<Arc<dyn VaultActions>>,
}

impl Session {
    pub(crate) fn connect(ctx: &Ctx, watch: Option<Address>) -> anyhow::Result<Self> {
        match &ctx.evm.private_key {
            Some(private_key) => {
                let wallet = connect_http(ctx.evm.rpc_url.clone(), private_key)?;
                let client = Arc::new(VaultClient::new(wallet, ctx.vault.clone()));
                info!(account = %client.account(), "Connected signing session");

                let query: Arc<dyn VaultQuery> = client.clone();
                let actions: Arc<dyn VaultActions> = client;
                Ok(Self {
                    query,
                    actions: Some(actions),
                })
            }
            None => {
                let provider = ProviderBuilder::new().connect_http(ctx.evm.rpc_url.clone());
                let evm = match watch {
                    Some(address) => ReadOnlyEvm::new(provider).with_caller(address),
                    None => ReadOnlyEvm::new(provider),
                };
                info!("Connected read-only session");

                Ok(Self::read_only(Arc::new(VaultClient::new(
                    evm,
                    ctx.vault.clone(),
                ))))
            }
        }
    }

    pub(crate) fn read_only(query: Arc<dyn VaultQuery>) -> Self {
        Self {
            query,
            actions: None,
        }
    }

    pub(crate) fn signing<A: VaultActions + 'static>(client: Arc<A>) -> Self {
        let query: Arc<dyn VaultQuery> = client.clone();
        let actions: Arc<dyn VaultActions> = client;

        Self {
            query,
            actions: Some(actions),
        }
    }

    fn actions(&self) -> Result<&dyn VaultActions, ChainCallError> {
        self.actions.as_deref().ok_or(ChainCallError::NotConnected)
    }

    fn account(&self) -> Option<Address> {
        self.actions.as_ref().map(|actions| actions.account())
    }
}

pub async fn run_command(ctx: Ctx, command: Commands) -> anyhow::Result<()> {
    let watch = match &command {
        Commands::Balances { address } => *address,
        _ => None,
    };
    let session = Session::connect(&ctx, watch)?;

    if let Commands::Panel { .. } = command {
        return panel::tui::run(session.query, session.actions).await;
    }

    run_command_with_writers(command, &session, &mut std::io::stdout()).await
}

async fn run_command_with_writers<W: Write>(
    command: Commands,
    session: &Session,
    stdout: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Balances { address } => {
            let signer = session.account();
            let Some(address) = address.or(signer) else {
                anyhow::bail!("balances needs --address when no private key is configured");
            };
            // Rewards resolve against the calling account.
            let include_rewards = signer.is_none_or(|signer| signer == address);

            vault::balances_command(stdout, session.query.as_ref(), address, include_rewards)
                .await?;
        }
        Commands::PreviewDeposit { amount } => {
            vault::preview_deposit_command(stdout, session.query.as_ref(), amount).await?;
        }
        Commands::PreviewWithdraw { amount } => {
            vault::preview_withdraw_command(stdout, session.query.as_ref(), amount).await?;
        }
        Commands::Approve { amount, spender } => {
            vault::approve_command(stdout, session.actions()?, amount, spender).await?;
        }
        Commands::Deposit { amount } => {
            vault::deposit_command(stdout, session.actions()?, amount).await?;
        }
        Commands::Withdraw { amount, to } => {
            vault::withdraw_command(stdout, session.actions()?, amount, to).await?;
        }
        Commands::Claim => {
            vault::claim_command(stdout, session.actions()?).await?;
        }
        Commands::Panel { .. } => {
            anyhow::bail!("the panel needs an interactive terminal");
        }
    }

    Ok(())
}
