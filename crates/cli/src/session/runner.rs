//! SessionRunner - top-level retry loop.

use std::sync::Arc;
use std::time::Instant;

use actor_factory::{ActorLifecycle, CarlaClient};
use contracts::{ActorRole, DriveConfig, SessionState};
use control::{ControlArbiter, InputDevice, InputTranslator};
use presenter::{DisplayPresenter, FrameRecorder, Surface};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use super::error::SessionError;
use super::shutdown::ShutdownSignal;
use super::stats::RunStats;

/// Runner state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Running,
    Retrying,
    Stopped,
}

/// Why a running session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Window closed, Escape or shutdown signal
    Quit,
    /// Configured tick budget reached
    TickLimit,
}

/// Drives sessions until the user quits.
///
/// Every error aborts the current session only: its actors are torn down,
/// the runner sleeps the fixed retry delay and starts over. Retries are
/// unbounded.
pub struct SessionRunner<C: CarlaClient, S: Surface, I: InputDevice> {
    lifecycle: ActorLifecycle<C>,
    presenter: DisplayPresenter<S>,
    input: I,
    config: DriveConfig,
    recorder: Option<Arc<FrameRecorder>>,
    shutdown: ShutdownSignal,
    max_ticks: Option<u64>,
    phase: SessionPhase,
    stats: RunStats,
}

impl<C: CarlaClient, S: Surface, I: InputDevice> SessionRunner<C, S, I> {
    pub fn new(client: C, presenter: DisplayPresenter<S>, input: I, config: DriveConfig) -> Self {
        Self {
            lifecycle: ActorLifecycle::new(client),
            presenter,
            input,
            config,
            recorder: None,
            shutdown: ShutdownSignal::new(),
            max_ticks: None,
            phase: SessionPhase::Stopped,
            stats: RunStats::default(),
        }
    }

    /// Save every decoded frame through `recorder`
    pub fn with_recorder(mut self, recorder: Arc<FrameRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Stop cleanly after `max_ticks` control ticks in total
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn presenter(&self) -> &DisplayPresenter<S> {
        &self.presenter
    }

    pub fn lifecycle(&self) -> &ActorLifecycle<C> {
        &self.lifecycle
    }

    /// Run until quit. Never returns a session error.
    #[instrument(
        name = "session_runner",
        skip_all,
        fields(host = %self.config.server.host, port = self.config.server.port)
    )]
    pub async fn run(&mut self) -> RunStats {
        let started = Instant::now();
        let retry_delay = self.config.session.retry_delay();

        loop {
            if self.shutdown.is_triggered() {
                break;
            }

            match self.run_session().await {
                Ok(end) => {
                    info!(reason = ?end, "session finished");
                    break;
                }
                Err(e) => {
                    self.phase = SessionPhase::Retrying;
                    self.stats.retries += 1;
                    self.stats.last_error = Some(e.to_string());
                    observability::record_session_retry(e.kind());
                    warn!(
                        error = %e,
                        kind = e.kind(),
                        retry_delay_ms = retry_delay.as_millis() as u64,
                        "session aborted, retrying"
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(retry_delay) => {}
                        _ = self.shutdown.wait() => {
                            debug!("shutdown requested during retry delay");
                        }
                    }
                }
            }
        }

        self.phase = SessionPhase::Stopped;
        self.stats.duration = started.elapsed();
        info!(
            sessions = self.stats.sessions_started,
            retries = self.stats.retries,
            ticks = self.stats.ticks,
            "session runner stopped"
        );
        self.stats.clone()
    }

    /// One connect → spawn → drive → teardown cycle
    async fn run_session(&mut self) -> Result<SessionEnd, SessionError> {
        self.phase = SessionPhase::Connecting;
        self.stats.attempts += 1;
        debug!(attempt = self.stats.attempts, "connecting");

        let (host, port) = (self.config.server.host.clone(), self.config.server.port);
        self.lifecycle.connect(&host, port).await?;

        let mailbox = self.presenter.mailbox();
        mailbox.clear();
        let on_frame = mailbox.sensor_callback(self.recorder.clone());

        // spawn_session 失败时自行回收已创建的 actor
        let mut state = self.lifecycle.spawn_session(&self.config, on_frame).await?;

        self.phase = SessionPhase::Running;
        self.stats.sessions_started += 1;
        observability::record_session_started();

        let outcome = self.drive(&mut state).await;
        self.lifecycle.teardown(state).await;
        outcome
    }

    /// Tick loop of a running session
    async fn drive(&mut self, state: &mut SessionState) -> Result<SessionEnd, SessionError> {
        let controlled = state.controlled.ok_or(SessionError::MissingActor {
            role: ActorRole::Controlled,
        })?;

        let mut translator = InputTranslator::new();
        let mut ticker = tokio::time::interval(self.config.session.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(actor_id = %controlled, mode = ?state.mode, "driving");

        loop {
            if self.tick_limit_reached() {
                return Ok(SessionEnd::TickLimit);
            }

            ticker.tick().await;
            let tick_started = Instant::now();

            let snapshot = self.input.poll();
            if snapshot.quit || self.shutdown.is_triggered() {
                return Ok(SessionEnd::Quit);
            }

            let input = translator.translate(snapshot.pressed);
            let action = ControlArbiter::arbitrate(state, &input);

            if let Some(enabled) = action.set_autonomous {
                self.lifecycle.set_autonomous(controlled, enabled).await?;
                self.stats.mode_switches += 1;
                observability::record_mode_switch(state.mode);
            }

            if let Some(command) = action.command {
                self.lifecycle.apply_command(controlled, &command).await?;
                self.stats.commands_applied += 1;
                observability::record_command_applied();
            }

            if self.presenter.render_tick()? {
                self.stats.frames_presented += 1;
            }

            self.stats.ticks += 1;
            let elapsed = tick_started.elapsed();
            self.stats.tick_ms.push(elapsed.as_secs_f64() * 1000.0);
            observability::record_tick_duration(elapsed);
        }
    }

    fn tick_limit_reached(&self) -> bool {
        self.max_ticks
            .is_some_and(|max_ticks| self.stats.ticks >= max_ticks)
    }
}
