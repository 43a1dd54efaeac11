//! Terminal rendering of the [`ActionPanel`].
//!
//! The event loop is the single owner of the panel. Key presses arrive
//! from a blocking input thread; previews, max lookups and submissions
//! run as tokio tasks. Everything reports back over one unbounded
//! channel and is applied in arrival order.

use std::io;
use std::sync::Arc;

use alloy::primitives::TxHash;
use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use super::{
    ActionPanel, MaxOutcome, MaxRequest, Mode, PreviewOutcome, PreviewRequest, PrimaryAction,
    Submission,
};
use crate::error::ChainCallError;
use crate::vault::{VaultActions, VaultQuery};

const CONNECT_HINT: &str =
    "No wallet connected. Add a private_key to the [evm] secrets to sign transactions.";

pub(crate) enum UiEvent {
    Input(Event),
    Preview(PreviewOutcome),
    Max(MaxOutcome),
    Submitted {
        mode: Mode,
        result: Result<TxHash, ChainCallError>,
    },
}

pub(crate) struct App {
    panel: ActionPanel,
    query: Arc<dyn VaultQuery>,
    actions: Option<Arc<dyn VaultActions>>,
    events: UnboundedSender<UiEvent>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(
        query: Arc<dyn VaultQuery>,
        actions: Option<Arc<dyn VaultActions>>,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        let account = actions.as_ref().map(|actions| actions.account());
        let panel = ActionPanel::new(account).with_deployment(query.deployment());

        Self {
            panel,
            query,
            actions,
            events,
            should_quit: false,
        }
    }

    /// Requests the initial preview.
    pub(crate) fn mount(&mut self) {
        let request = self.panel.refresh_preview();
        self.spawn_preview(request);
    }

    #[cfg(test)]
    pub(crate) fn panel(&self) -> &ActionPanel {
        &self.panel
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Input(Event::Key(key)) => self.handle_key(key),
            UiEvent::Input(_) => {}
            UiEvent::Preview(outcome) => {
                self.panel.apply_preview(outcome);
            }
            UiEvent::Max(outcome) => {
                if let Some(request) = self.panel.apply_max(outcome) {
                    self.spawn_preview(request);
                }
            }
            UiEvent::Submitted { mode, result } => {
                match &result {
                    Ok(tx_hash) => info!(%mode, %tx_hash, "Submission accepted"),
                    Err(error) => warn!(%mode, %error, "Submission failed"),
                }
                self.panel.record_submission(mode, result);
            }
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.select_mode(self.panel.mode().next()),
            KeyCode::BackTab | KeyCode::Left => self.select_mode(self.panel.mode().previous()),
            KeyCode::Char('m') => self.request_max(),
            KeyCode::Char(c) => self.handle_char(c),
            KeyCode::Backspace => {
                let mut amount = self.panel.amount().to_string();
                if amount.pop().is_some() {
                    self.set_amount(amount);
                }
            }
            KeyCode::Enter => self.execute(),
            _ => {}
        }
    }

    fn handle_char(&mut self, c: char) {
        if let Some(mode) = Mode::from_shortcut(c) {
            self.select_mode(mode);
        } else if c.is_ascii_digit() || c == '.' {
            let mut amount = self.panel.amount().to_string();
            amount.push(c);
            self.set_amount(amount);
        }
    }

    fn select_mode(&mut self, mode: Mode) {
        let request = self.panel.select_mode(mode);
        self.spawn_preview(request);
    }

    fn set_amount(&mut self, amount: String) {
        if let Some(request) = self.panel.set_amount(amount) {
            self.spawn_preview(request);
        }
    }

    fn request_max(&mut self) {
        let Some(request) = self.panel.max_request() else {
            debug!(mode = %self.panel.mode(), "Max unavailable");
            return;
        };

        self.spawn_max(request);
    }

    fn execute(&mut self) {
        match self.panel.primary_action() {
            PrimaryAction::ConnectWallet => self.panel.set_status(CONNECT_HINT),
            PrimaryAction::Submit(submission) => match self.actions.clone() {
                Some(actions) => {
                    self.panel
                        .set_status(format!("Submitting {}...", submission.mode));
                    self.spawn_submission(submission, actions);
                }
                None => self
                    .panel
                    .record_submission(submission.mode, Err(ChainCallError::NotConnected)),
            },
        }
    }

    fn spawn_preview(&self, request: PreviewRequest) {
        let query = Arc::clone(&self.query);
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = request.run(query.as_ref()).await;
            // The receiver is gone once the UI has exited.
            let _ = events.send(UiEvent::Preview(outcome));
        });
    }

    fn spawn_max(&self, request: MaxRequest) {
        let query = Arc::clone(&self.query);
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = request.run(query.as_ref()).await;
            let _ = events.send(UiEvent::Max(outcome));
        });
    }

    fn spawn_submission(&self, submission: Submission, actions: Arc<dyn VaultActions>) {
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = submission.submit(actions.as_ref()).await;
            let _ = events.send(UiEvent::Submitted {
                mode: submission.mode,
                result,
            });
        });
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // account
                Constraint::Length(3), // mode tabs
                Constraint::Length(3), // amount
                Constraint::Length(3), // preview
                Constraint::Length(3), // primary action
                Constraint::Min(3),    // status
                Constraint::Length(1), // key help
            ])
            .split(frame.area());

        let account = self
            .panel
            .account()
            .map_or_else(|| "not connected".to_string(), |account| account.to_string());
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Wallet: ", Style::default().fg(Color::Yellow)),
                Span::raw(account),
            ]))
            .block(titled(" Stargate Vault ")),
            chunks[0],
        );

        let selected = Mode::ALL
            .iter()
            .position(|mode| *mode == self.panel.mode())
            .unwrap_or_default();
        frame.render_widget(
            Tabs::new(
                Mode::ALL
                    .iter()
                    .map(|mode| format!("{} ({})", mode.label(), mode.shortcut())),
            )
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .block(titled(" Mode ")),
            chunks[1],
        );

        let amount = if self.panel.mode().takes_amount() {
            Line::from(vec![
                Span::raw(self.panel.amount().to_string()),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
                Span::raw("  "),
                Span::styled("[m] Max", Style::default().fg(Color::Green)),
            ])
        } else {
            Line::from(Span::styled(
                "Claims the full reward balance",
                Style::default().fg(Color::Gray),
            ))
        };
        frame.render_widget(Paragraph::new(amount).block(titled(" Amount ")), chunks[2]);

        frame.render_widget(
            Paragraph::new(self.panel.preview_text()).block(titled(" Preview ")),
            chunks[3],
        );

        let action = match self.panel.primary_action() {
            PrimaryAction::ConnectWallet => Span::styled(
                "[Enter] Connect a wallet",
                Style::default().fg(Color::Yellow),
            ),
            PrimaryAction::Submit(submission) => Span::styled(
                format!("[Enter] {}", submission.mode),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        frame.render_widget(
            Paragraph::new(Line::from(action)).block(titled(" Action ")),
            chunks[4],
        );

        frame.render_widget(
            Paragraph::new(self.panel.status().unwrap_or_default())
                .wrap(Wrap { trim: true })
                .block(titled(" Status ")),
            chunks[5],
        );

        frame.render_widget(
            Paragraph::new(
                "[Tab/←/→/d/w/c] mode  [0-9 .] amount  [Backspace] delete  [m] max  [Enter] execute  [q] quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
            chunks[6],
        );
    }
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}

/// Runs the panel until the user quits, restoring the terminal on exit.
pub async fn run(
    query: Arc<dyn VaultQuery>,
    actions: Option<Arc<dyn VaultActions>>,
) -> anyhow::Result<()> {
    let (sender, receiver) = unbounded_channel();
    spawn_input_reader(sender.clone());

    let mut app = App::new(query, actions, sender);
    app.mount();

    enable_raw_mode()?;

    restoring(
        async {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

            event_loop(&mut terminal, &mut app, receiver).await
        },
        restore_terminal,
    )
    .await
}

/// Awaits `body`, then runs `restore` whatever the outcome. The body's
/// error takes precedence over a restore failure.
async fn restoring<F, R>(body: F, restore: R) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
    R: FnOnce() -> io::Result<()>,
{
    let result = body.await;
    let restored = restore();

    result?;
    restored?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut receiver: UnboundedReceiver<UiEvent>,
) -> anyhow::Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| app.draw(frame))?;

        let Some(event) = receiver.recv().await else {
            break;
        };
        app.handle_event(event);
    }

    Ok(())
}

/// Forwards terminal input from a dedicated thread; `event::read`
/// blocks.
fn spawn_input_reader(events: UnboundedSender<UiEvent>) {
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if events.send(UiEvent::Input(event)).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "Terminal input failed");
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use alloy::primitives::{Address, address};
    use ratatui::backend::TestBackend;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::amount::TokenAmount;
    use crate::panel::Preview;
    use crate::vault::mock::{MockVault, RecordedCall};

    const USER: Address = address!("0x1111111111111111111111111111111111111111");

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn connected(mock: MockVault) -> (App, Arc<MockVault>, UnboundedReceiver<UiEvent>) {
        let mock = Arc::new(mock);
        let (sender, receiver) = unbounded_channel();
        let query: Arc<dyn VaultQuery> = mock.clone();
        let actions: Arc<dyn VaultActions> = mock.clone();

        (App::new(query, Some(actions), sender), mock, receiver)
    }

    fn disconnected(mock: MockVault) -> (App, Arc<MockVault>, UnboundedReceiver<UiEvent>) {
        let mock = Arc::new(mock);
        let (sender, receiver) = unbounded_channel();
        let query: Arc<dyn VaultQuery> = mock.clone();

        (App::new(query, None, sender), mock, receiver)
    }

    async fn apply_next(app: &mut App, receiver: &mut UnboundedReceiver<UiEvent>) {
        let event = receiver.recv().await.unwrap();
        app.handle_event(event);
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn typing_amount_updates_preview() {
        let (mut app, _mock, mut receiver) =
            connected(MockVault::new(USER).with_rate(dec!(0.5)));

        app.handle_key(press(KeyCode::Char('4')));
        app.handle_key(press(KeyCode::Char('0')));
        apply_next(&mut app, &mut receiver).await;
        apply_next(&mut app, &mut receiver).await;

        assert_eq!(app.panel().amount(), "40");
        assert_eq!(
            app.panel().preview(),
            &Preview::Ready(TokenAmount::new(dec!(20)))
        );
    }

    #[tokio::test]
    async fn backspace_removes_last_character() {
        let (mut app, _mock, _receiver) = connected(MockVault::new(USER));

        app.handle_key(press(KeyCode::Char('1')));
        app.handle_key(press(KeyCode::Char('.')));
        app.handle_key(press(KeyCode::Char('5')));
        app.handle_key(press(KeyCode::Backspace));

        assert_eq!(app.panel().amount(), "1.");
    }

    #[tokio::test]
    async fn tab_cycles_modes_and_clears_amount() {
        let (mut app, _mock, _receiver) = connected(MockVault::new(USER));
        app.handle_key(press(KeyCode::Char('7')));

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.panel().mode(), Mode::Withdraw);
        assert_eq!(app.panel().amount(), "");

        app.handle_key(press(KeyCode::Left));
        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.panel().mode(), Mode::Claim);
    }

    #[tokio::test]
    async fn shortcut_letters_select_mode() {
        let (mut app, _mock, _receiver) = connected(MockVault::new(USER));

        app.handle_key(press(KeyCode::Char('c')));
        assert_eq!(app.panel().mode(), Mode::Claim);

        app.handle_key(press(KeyCode::Char('w')));
        assert_eq!(app.panel().mode(), Mode::Withdraw);

        app.handle_key(press(KeyCode::Char('3')));
        assert_eq!(app.panel().mode(), Mode::Withdraw, "digits edit the amount");
        assert_eq!(app.panel().amount(), "3");
    }

    #[tokio::test]
    async fn max_key_fills_share_balance_in_withdraw() {
        let (mut app, _mock, mut receiver) =
            connected(MockVault::new(USER).with_balances(dec!(100), dec!(25)));
        app.handle_key(press(KeyCode::Tab));
        apply_next(&mut app, &mut receiver).await;

        app.handle_key(press(KeyCode::Char('m')));
        apply_next(&mut app, &mut receiver).await;

        assert_eq!(app.panel().amount(), "25");
    }

    #[tokio::test]
    async fn enter_submits_current_mode() {
        let (mut app, mock, mut receiver) = connected(MockVault::new(USER));
        app.handle_key(press(KeyCode::Char('5')));
        apply_next(&mut app, &mut receiver).await;

        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.panel().status(), Some("Submitting Deposit..."));
        apply_next(&mut app, &mut receiver).await;

        assert_eq!(
            mock.calls(),
            vec![RecordedCall::Deposit(TokenAmount::new(dec!(5)))]
        );
        assert!(
            app.panel()
                .status()
                .unwrap()
                .starts_with("Deposit submitted: 0x")
        );
    }

    #[tokio::test]
    async fn enter_without_wallet_shows_connect_hint() {
        let (mut app, _mock, _receiver) = disconnected(MockVault::new(USER));

        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.panel().status(), Some(CONNECT_HINT));
    }

    #[tokio::test]
    async fn quit_keys_stop_the_loop() {
        let (mut app, _mock, _receiver) = disconnected(MockVault::new(USER));
        assert!(!app.should_quit());

        app.handle_key(press(KeyCode::Char('q')));

        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn ctrl_c_quits_instead_of_selecting_claim() {
        let (mut app, _mock, _receiver) = connected(MockVault::new(USER));

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert!(app.should_quit());
        assert_eq!(app.panel().mode(), Mode::Deposit);
    }

    #[tokio::test]
    async fn claim_without_wallet_reads_nothing_from_chain() {
        let (mut app, mock, mut receiver) =
            disconnected(MockVault::new(USER).with_rewards(dec!(3.5)));

        app.handle_key(press(KeyCode::Char('c')));
        apply_next(&mut app, &mut receiver).await;
        app.handle_key(press(KeyCode::Enter));

        assert!(receiver.try_recv().is_err());
        assert!(mock.queries().is_empty(), "got: {:?}", mock.queries());
        assert!(mock.calls().is_empty());
        assert_eq!(app.panel().mode(), Mode::Claim);

        let screen = render(&app);
        assert!(screen.contains("Connect a wallet"));
        assert!(!screen.contains("You can claim"));
    }

    #[tokio::test]
    async fn terminal_is_restored_when_setup_fails() {
        let restored = AtomicBool::new(false);

        let result = restoring(
            async { Err(anyhow::anyhow!("alternate screen unavailable")) },
            || {
                restored.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert!(result.is_err());
        assert!(restored.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn renders_connect_affordance_without_wallet() {
        let (mut app, _mock, _receiver) = disconnected(MockVault::new(USER));
        app.handle_key(press(KeyCode::BackTab));

        let screen = render(&app);

        assert!(screen.contains("Connect a wallet"));
        assert!(screen.contains("Claims the full reward balance"));
        assert!(screen.contains("not connected"));
    }

    #[tokio::test]
    async fn renders_preview_and_action_label() {
        let (mut app, _mock, mut receiver) = connected(MockVault::new(USER));
        app.handle_key(press(KeyCode::Char('8')));
        apply_next(&mut app, &mut receiver).await;

        let screen = render(&app);

        assert!(screen.contains("You'll get 8 USDC-SV tokens"));
        assert!(screen.contains("[Enter] Deposit"));
        assert!(screen.contains("[m] Max"));
    }
}
