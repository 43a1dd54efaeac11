//! Deposit / Withdraw / Claim panel.
//!
//! [`ActionPanel`] holds the transient UI state and never touches the
//! chain itself. Operations that need chain data hand back a request
//! ([`PreviewRequest`], [`MaxRequest`], [`Submission`]) that the caller
//! runs against a [`VaultQuery`] or [`VaultActions`] and feeds the
//! outcome back in. Every preview request carries a [`Ticket`]; only
//! the outcome for the most recently issued ticket is applied, so a
//! slow response can never overwrite a newer one.

use std::fmt::Display;

use alloy::primitives::{Address, TxHash};
use tracing::debug;

use crate::amount::TokenAmount;
use crate::error::ChainCallError;
use crate::vault::{VaultActions, VaultDeployment, VaultQuery};

pub mod tui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Deposit,
    Withdraw,
    Claim,
}

impl Mode {
    pub const ALL: [Self; 3] = [Self::Deposit, Self::Withdraw, Self::Claim];

    pub fn label(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdraw",
            Self::Claim => "Claim",
        }
    }

    /// Claim always acts on the full reward balance, so it has no
    /// amount input.
    pub fn takes_amount(self) -> bool {
        !matches!(self, Self::Claim)
    }

    /// Key selecting this mode in the terminal panel.
    pub fn shortcut(self) -> char {
        match self {
            Self::Deposit => 'd',
            Self::Withdraw => 'w',
            Self::Claim => 'c',
        }
    }

    pub fn from_shortcut(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.shortcut() == key)
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Deposit => Self::Withdraw,
            Self::Withdraw => Self::Claim,
            Self::Claim => Self::Deposit,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            Self::Deposit => Self::Claim,
            Self::Withdraw => Self::Deposit,
            Self::Claim => Self::Withdraw,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sequence number of a preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Idle,
    Loading,
    Ready(TokenAmount),
    Failed(String),
}

/// Preview lookup for one mode/amount snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub ticket: Ticket,
    pub mode: Mode,
    pub amount: String,
    pub account: Option<Address>,
}

#[derive(Debug)]
pub struct PreviewOutcome {
    pub ticket: Ticket,
    pub result: Result<TokenAmount, ChainCallError>,
}

impl PreviewRequest {
    /// Rewards are read on behalf of the connected account, so a claim
    /// preview without one resolves to `NotConnected` and makes no call.
    pub async fn run<Q: VaultQuery + ?Sized>(self, query: &Q) -> PreviewOutcome {
        let result = match self.mode {
            Mode::Deposit => match preview_amount(&self.amount) {
                Ok(amount) => query.preview_deposit(amount).await,
                Err(error) => Err(error),
            },
            Mode::Withdraw => match preview_amount(&self.amount) {
                Ok(amount) => query.preview_withdraw(amount).await,
                Err(error) => Err(error),
            },
            Mode::Claim => match self.account {
                Some(_) => query.reward_balance().await,
                None => Err(ChainCallError::NotConnected),
            },
        };

        PreviewOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// An empty input previews as zero.
fn preview_amount(text: &str) -> Result<TokenAmount, ChainCallError> {
    if text.trim().is_empty() {
        return Ok(TokenAmount::ZERO);
    }

    Ok(text.parse()?)
}

/// Balance lookup behind the max helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxRequest {
    pub mode: Mode,
    pub account: Address,
}

#[derive(Debug)]
pub struct MaxOutcome {
    pub mode: Mode,
    pub result: Result<TokenAmount, ChainCallError>,
}

impl MaxRequest {
    pub async fn run<Q: VaultQuery + ?Sized>(self, query: &Q) -> MaxOutcome {
        let result = match self.mode {
            Mode::Deposit => query.asset_balance(self.account).await,
            Mode::Withdraw | Mode::Claim => query.share_balance(self.account).await,
        };

        MaxOutcome {
            mode: self.mode,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAction {
    /// No wallet: show the connect affordance instead of submitting.
    ConnectWallet,
    Submit(Submission),
}

/// Write for the current mode, detached from the panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub mode: Mode,
    pub amount: String,
    pub recipient: Address,
}

impl Submission {
    /// Dispatches the mode's write. Deposit and withdraw validate the
    /// amount before anything is sent; claim ignores it.
    pub async fn submit<A: VaultActions + ?Sized>(
        &self,
        actions: &A,
    ) -> Result<TxHash, ChainCallError> {
        match self.mode {
            Mode::Deposit => actions.deposit(write_amount(&self.amount)?).await,
            Mode::Withdraw => {
                actions
                    .withdraw(write_amount(&self.amount)?, self.recipient)
                    .await
            }
            Mode::Claim => actions.claim_rewards().await,
        }
    }
}

fn write_amount(text: &str) -> Result<TokenAmount, ChainCallError> {
    let amount: TokenAmount = text.parse()?;

    if amount.is_zero() || amount.is_negative() {
        return Err(ChainCallError::NonPositiveAmount);
    }

    Ok(amount)
}

/// Transient state of the three-mode panel.
#[derive(Debug, Clone)]
pub struct ActionPanel {
    mode: Mode,
    amount: String,
    preview: Preview,
    account: Option<Address>,
    status: Option<String>,
    latest: Ticket,
    asset_symbol: String,
    share_symbol: String,
}

impl ActionPanel {
    /// Starts in deposit mode with an empty amount.
    pub fn new(account: Option<Address>) -> Self {
        let deployment = VaultDeployment::default();

        Self {
            mode: Mode::Deposit,
            amount: String::new(),
            preview: Preview::Idle,
            account,
            status: None,
            latest: Ticket::default(),
            asset_symbol: deployment.asset_symbol,
            share_symbol: deployment.share_symbol,
        }
    }

    /// Uses the deployment's symbols in preview text.
    #[must_use]
    pub fn with_deployment(mut self, deployment: &VaultDeployment) -> Self {
        self.asset_symbol.clone_from(&deployment.asset_symbol);
        self.share_symbol.clone_from(&deployment.share_symbol);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Preview for the current mode and amount, as on first render.
    pub fn refresh_preview(&mut self) -> PreviewRequest {
        self.latest = Ticket(self.latest.0 + 1);
        self.preview = Preview::Loading;

        debug!(ticket = self.latest.0, mode = %self.mode, amount = %self.amount, "Preview requested");

        PreviewRequest {
            ticket: self.latest,
            mode: self.mode,
            amount: self.amount.clone(),
            account: self.account,
        }
    }

    /// Switches mode, clearing the amount. Always yields exactly one
    /// preview request, even when re-selecting the current mode.
    pub fn select_mode(&mut self, mode: Mode) -> PreviewRequest {
        self.mode = mode;
        self.amount.clear();
        self.refresh_preview()
    }

    /// Updates the amount input. Claim has no input, so nothing changes
    /// and no preview is issued.
    pub fn set_amount(&mut self, text: impl Into<String>) -> Option<PreviewRequest> {
        if !self.mode.takes_amount() {
            return None;
        }

        self.amount = text.into();
        Some(self.refresh_preview())
    }

    /// Balance lookup for the max helper: assets when depositing, shares
    /// when withdrawing.
    pub fn max_request(&self) -> Option<MaxRequest> {
        let account = self.account?;

        self.mode.takes_amount().then_some(MaxRequest {
            mode: self.mode,
            account,
        })
    }

    /// Writes the looked-up balance into the amount input. Outcomes for
    /// a mode the user has since left are dropped.
    pub fn apply_max(&mut self, outcome: MaxOutcome) -> Option<PreviewRequest> {
        if outcome.mode != self.mode {
            debug!(requested = %outcome.mode, current = %self.mode, "Dropping max for inactive mode");
            return None;
        }

        match outcome.result {
            Ok(amount) => self.set_amount(amount.to_string()),
            Err(error) => {
                self.status = Some(error.user_message());
                None
            }
        }
    }

    /// Stores a preview result if it answers the latest request. Returns
    /// whether it was applied.
    pub fn apply_preview(&mut self, outcome: PreviewOutcome) -> bool {
        if outcome.ticket != self.latest {
            debug!(
                ticket = outcome.ticket.0,
                latest = self.latest.0,
                "Dropping stale preview"
            );
            return false;
        }

        self.preview = match outcome.result {
            Ok(amount) => Preview::Ready(amount),
            Err(error) => Preview::Failed(error.user_message()),
        };

        true
    }

    pub fn preview_text(&self) -> String {
        match &self.preview {
            Preview::Idle => String::new(),
            Preview::Loading => "Loading preview...".to_string(),
            Preview::Failed(message) => message.clone(),
            Preview::Ready(amount) => match self.mode {
                Mode::Deposit => format!("You'll get {amount} {} tokens", self.share_symbol),
                Mode::Withdraw => format!("You'll burn {amount} {} tokens", self.share_symbol),
                Mode::Claim => {
                    format!("You can claim {amount} {} tokens as reward", self.asset_symbol)
                }
            },
        }
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.account {
            None => PrimaryAction::ConnectWallet,
            Some(recipient) => PrimaryAction::Submit(Submission {
                mode: self.mode,
                amount: self.amount.clone(),
                recipient,
            }),
        }
    }

    pub fn record_submission(&mut self, mode: Mode, result: Result<TxHash, ChainCallError>) {
        self.status = Some(match result {
            Ok(tx_hash) => format!("{mode} submitted: {tx_hash}"),
            Err(error) => format!("{mode} failed: {}", error.user_message()),
        });
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}
