//! Balance, preview and vault write commands.

use alloy::primitives::Address;
use std::io::Write;

use crate::amount::TokenAmount;
use crate::error::ChainCallError;
use crate::vault::{VaultActions, VaultQuery};

/// Prints the user-facing message before handing the error back.
fn report<T, W: Write>(stdout: &mut W, result: Result<T, ChainCallError>) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(error) => {
            writeln!(stdout, "❌ {}", error.user_message())?;
            Err(error.into())
        }
    }
}

pub(super) async fn balances_command<W: Write, Q: VaultQuery + ?Sized>(
    stdout: &mut W,
    query: &Q,
    address: Address,
    include_rewards: bool,
) -> anyhow::Result<()> {
    let deployment = query.deployment();
    writeln!(stdout, "Balances for {address}")?;

    let assets = report(stdout, query.asset_balance(address).await)?;
    writeln!(stdout, "   {}: {assets}", deployment.asset_symbol)?;

    let shares = report(stdout, query.share_balance(address).await)?;
    writeln!(stdout, "   {}: {shares}", deployment.share_symbol)?;

    let withdrawable = report(stdout, query.max_withdrawable(address).await)?;
    writeln!(
        stdout,
        "   Max withdrawable: {withdrawable} {}",
        deployment.asset_symbol
    )?;

    if include_rewards {
        let rewards = report(stdout, query.reward_balance().await)?;
        writeln!(
            stdout,
            "   Claimable rewards: {rewards} {}",
            deployment.asset_symbol
        )?;
    }

    Ok(())
}

pub(super) async fn preview_deposit_command<W: Write, Q: VaultQuery + ?Sized>(
    stdout: &mut W,
    query: &Q,
    amount: TokenAmount,
) -> anyhow::Result<()> {
    let deployment = query.deployment();
    let shares = report(stdout, query.preview_deposit(amount).await)?;

    writeln!(
        stdout,
        "Depositing {amount} {} mints {shares} {}",
        deployment.asset_symbol, deployment.share_symbol
    )?;

    Ok(())
}

pub(super) async fn preview_withdraw_command<W: Write, Q: VaultQuery + ?Sized>(
    stdout: &mut W,
    query: &Q,
    amount: TokenAmount,
) -> anyhow::Result<()> {
    let deployment = query.deployment();
    let burned = report(stdout, query.preview_withdraw(amount).await)?;

    writeln!(
        stdout,
        "Withdrawing {amount} {} burns {burned} {}",
        deployment.asset_symbol, deployment.share_symbol
    )?;

    Ok(())
}

pub(super) async fn approve_command<W: Write, A: VaultActions + ?Sized>(
    stdout: &mut W,
    actions: &A,
    amount: TokenAmount,
    spender: Option<Address>,
) -> anyhow::Result<()> {
    let deployment = actions.deployment();
    let spender = spender.unwrap_or(deployment.wrapper);

    writeln!(stdout, "Approving {amount} {}", deployment.asset_symbol)?;
    writeln!(stdout, "   Owner: {}", actions.account())?;
    writeln!(stdout, "   Spender: {spender}")?;

    let tx_hash = report(stdout, actions.approve(amount, spender).await)?;
    writeln!(stdout, "   Approval tx: {tx_hash}")?;

    Ok(())
}

pub(super) async fn deposit_command<W: Write, A: VaultActions + ?Sized>(
    stdout: &mut W,
    actions: &A,
    amount: TokenAmount,
) -> anyhow::Result<()> {
    let deployment = actions.deployment();

    writeln!(stdout, "Depositing {amount} {}", deployment.asset_symbol)?;
    writeln!(stdout, "   Sender: {}", actions.account())?;
    writeln!(stdout, "   Wrapper: {}", deployment.wrapper)?;

    let tx_hash = report(stdout, actions.deposit(amount).await)?;
    writeln!(stdout, "   Deposit tx: {tx_hash}")?;

    Ok(())
}

pub(super) async fn withdraw_command<W: Write, A: VaultActions + ?Sized>(
    stdout: &mut W,
    actions: &A,
    amount: TokenAmount,
    to: Option<Address>,
) -> anyhow::Result<()> {
    let deployment = actions.deployment();
    let recipient = to.unwrap_or_else(|| actions.account());

    writeln!(stdout, "Withdrawing {amount} {}", deployment.asset_symbol)?;
    writeln!(stdout, "   Recipient: {recipient}")?;

    let tx_hash = report(stdout, actions.withdraw(amount, recipient).await)?;
    writeln!(stdout, "   Withdraw tx: {tx_hash}")?;

    Ok(())
}

pub(super) async fn claim_command<W: Write, A: VaultActions + ?Sized>(
    stdout: &mut W,
    actions: &A,
) -> anyhow::Result<()> {
    writeln!(stdout, "Claiming rewards for {}", actions.account())?;

    let tx_hash = report(stdout, actions.claim_rewards().await)?;
    writeln!(stdout, "   Claim tx: {tx_hash}")?;

    Ok(())
}
