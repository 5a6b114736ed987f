//! Session controller: the single owner of step, intake, strategy and chat.
//!
//! Requests carry clones of the state they need, so no lock is held while
//! the external model is working.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::dashboard::DashboardView;
use crate::domains::chat::{ChatHistory, ChatMessage};
use crate::domains::intake::IntakeRecord;
use crate::domains::strategy::GrowthStrategy;
use crate::error::{GrowthFlowError, Result};
use crate::prompts;
use crate::services::strategy::StrategyClient;
use crate::session_fsm::{transition, SessionAction, SessionStep};
use crate::ticker::StatusTicker;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub step: SessionStep,
    pub intake: Option<IntakeRecord>,
    pub strategy: Option<Arc<GrowthStrategy>>,
    pub history: ChatHistory,
    pub dashboard: DashboardView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Blank input: nothing sent, nothing recorded.
    Ignored,
    Replied(String),
}

/// Clears an in-flight flag on every exit path, including cancellation.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, what: &str) -> Result<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(GrowthFlowError::Busy(what.to_string()));
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Settles a request whose future was dropped before the reply arrived.
/// Disarmed once the normal settlement holds the state lock.
struct Abandoned<'a> {
    controller: &'a SessionController,
    settle: Option<fn(&mut SessionState)>,
}

impl<'a> Abandoned<'a> {
    fn arm(controller: &'a SessionController, settle: fn(&mut SessionState)) -> Self {
        Self {
            controller,
            settle: Some(settle),
        }
    }

    fn disarm(mut self) {
        self.settle = None;
    }
}

impl Drop for Abandoned<'_> {
    fn drop(&mut self) {
        if let Some(settle) = self.settle.take() {
            self.controller.settle_abandoned(settle);
        }
    }
}

fn abandon_generation(state: &mut SessionState) {
    if state.step == SessionStep::Processing {
        warn!("generation abandoned, returning to onboarding");
        state.step = SessionStep::Onboarding;
    }
}

fn abandon_chat_turn(state: &mut SessionState) {
    warn!("chat turn abandoned, recording fallback reply");
    state
        .history
        .push(ChatMessage::advisor(prompts::CHAT_FALLBACK_REPLY));
}

pub struct SessionController {
    client: StrategyClient,
    state: Arc<RwLock<SessionState>>,
    chat_in_flight: AtomicBool,
    status_interval: Duration,
    status_tx: watch::Sender<String>,
    ticker: Mutex<Option<StatusTicker>>,
}

impl SessionController {
    pub fn new(client: StrategyClient, status_interval: Duration) -> Self {
        let (status_tx, _) = watch::channel(prompts::INITIAL_STATUS.to_string());
        Self {
            client,
            state: Arc::new(RwLock::new(SessionState::default())),
            chat_in_flight: AtomicBool::new(false),
            status_interval,
            status_tx,
            ticker: Mutex::new(None),
        }
    }

    pub async fn step(&self) -> SessionStep {
        self.state.read().await.step
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn intake(&self) -> Option<IntakeRecord> {
        self.state.read().await.intake.clone()
    }

    pub async fn strategy(&self) -> Option<Arc<GrowthStrategy>> {
        self.state.read().await.strategy.clone()
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.state.read().await.history.messages().to_vec()
    }

    /// Processing status lines; meaningful only while a generation runs.
    pub fn subscribe_status(&self) -> watch::Receiver<String> {
        self.status_tx.subscribe()
    }

    pub fn status_ticker_running(&self) -> bool {
        self.lock_ticker()
            .as_ref()
            .is_some_and(StatusTicker::is_running)
    }

    pub fn chat_pending(&self) -> bool {
        self.chat_in_flight.load(Ordering::SeqCst)
    }

    pub async fn with_dashboard<T>(
        &self,
        f: impl FnOnce(&mut DashboardView, &GrowthStrategy) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        let SessionState {
            step,
            strategy,
            dashboard,
            ..
        } = &mut *state;
        match (*step, strategy.as_ref()) {
            (SessionStep::Dashboard, Some(strategy)) => f(dashboard, strategy.as_ref()),
            _ => Err(GrowthFlowError::Transition(format!(
                "dashboard is not available in step {step}"
            ))),
        }
    }

    fn lock_ticker(&self) -> std::sync::MutexGuard<'_, Option<StatusTicker>> {
        match self.ticker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Stops the status ticker and applies `settle` now, or on a spawned
    /// task when the state lock is busy.
    fn settle_abandoned(&self, settle: fn(&mut SessionState)) {
        drop(self.lock_ticker().take());
        match self.state.try_write() {
            Ok(mut state) => settle(&mut state),
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let state = Arc::clone(&self.state);
                    handle.spawn(async move { settle(&mut *state.write().await) });
                }
                Err(_) => warn!("no runtime to settle an abandoned request"),
            },
        }
    }

    fn apply(state: &mut SessionState, action: SessionAction) -> Result<()> {
        let next = transition(state.step, action).ok_or_else(|| {
            GrowthFlowError::Transition(format!("{action:?} is not allowed in step {}", state.step))
        })?;
        info!(from = %state.step, to = %next, "session step");
        state.step = next;
        Ok(())
    }

    /// Welcome → Onboarding.
    pub async fn begin(&self) -> Result<()> {
        let mut state = self.state.write().await;
        Self::apply(&mut state, SessionAction::Begin)
    }

    /// Onboarding → Processing → Dashboard, or back to Onboarding on failure
    /// with the submitted record kept for resubmission.
    ///
    /// Invalid input is rejected before any state change or request.
    pub async fn submit_intake(&self, intake: IntakeRecord) -> Result<Arc<GrowthStrategy>> {
        intake.validate()?;
        {
            let mut state = self.state.write().await;
            Self::apply(&mut state, SessionAction::Submit)?;
            state.intake = Some(intake.clone());
        }

        let pending = Abandoned::arm(self, abandon_generation);
        let ticker = StatusTicker::start(self.status_interval, self.status_tx.clone());
        *self.lock_ticker() = Some(ticker);

        let result = self.client.generate_strategy(&intake).await;

        let ticker = self.lock_ticker().take();
        if let Some(ticker) = ticker {
            ticker.stop().await;
        }

        let mut state = self.state.write().await;
        pending.disarm();
        match result {
            Ok(strategy) => {
                let strategy = Arc::new(strategy);
                Self::apply(&mut state, SessionAction::Succeed)?;
                state
                    .history
                    .push(ChatMessage::advisor(prompts::advisor_greeting(&intake, &strategy)));
                state.strategy = Some(Arc::clone(&strategy));
                Ok(strategy)
            }
            Err(err) => {
                warn!("generation failed, returning to onboarding: {err}");
                Self::apply(&mut state, SessionAction::Fail)?;
                if matches!(err, GrowthFlowError::GenerationFailed(_)) {
                    Err(err)
                } else {
                    Err(GrowthFlowError::GenerationFailed(err.to_string()))
                }
            }
        }
    }

    /// Sends one chat turn. The user message is recorded before the request
    /// and the reply (or the fallback reply) after it, so every accepted turn
    /// grows the history by exactly two messages, even when the caller drops
    /// the future mid-request.
    pub async fn send_chat_message(&self, input: &str) -> Result<ChatOutcome> {
        if input.trim().is_empty() {
            return Ok(ChatOutcome::Ignored);
        }
        let _in_flight = InFlight::acquire(&self.chat_in_flight, "a chat reply is pending")?;

        let (prior, intake, strategy) = {
            let mut state = self.state.write().await;
            let ready = (state.step == SessionStep::Dashboard)
                .then(|| state.intake.clone().zip(state.strategy.clone()))
                .flatten();
            let Some((intake, strategy)) = ready else {
                return Err(GrowthFlowError::Transition(format!(
                    "chat is not available in step {}",
                    state.step
                )));
            };
            let prior = state.history.messages().to_vec();
            state.history.push(ChatMessage::user(input));
            (prior, intake, strategy)
        };
        let pending = Abandoned::arm(self, abandon_chat_turn);

        let reply = self
            .client
            .chat_with_consultant(&prior, input, &intake, &strategy)
            .await;

        let mut state = self.state.write().await;
        pending.disarm();
        state.history.push(ChatMessage::advisor(reply.clone()));
        Ok(ChatOutcome::Replied(reply))
    }
}
