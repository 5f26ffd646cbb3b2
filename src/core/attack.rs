/*!
 * Dictionary attack controller
 *
 * Walks the dictionary in order, expands each entry into candidates and asks
 * the oracle about each one, sequentially:
 * - stops at the first accepted candidate
 * - reports progress once per fully processed dictionary entry (casing
 *   expansion does not count towards progress)
 * - checks for cancellation before every candidate
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::candidates::{candidates, CasingMode};
use super::channel::DEFAULT_FIFO_MODE;
use super::error::AttackError;
use super::oracle::Oracle;
use super::reporter::{Reporter, StageSink};

pub const ATTACK_STAGE: &str = "Running dictionary attack";

/// Attack configuration
#[derive(Debug, Clone)]
pub struct AttackConfig {
    pub dictionary: PathBuf,
    pub casing: CasingMode,
    /// Explicit helper path, bypassing the search
    pub helper: Option<PathBuf>,
    pub fifo_mode: u32,
}

impl AttackConfig {
    pub fn new(dictionary: PathBuf) -> Self {
        Self {
            dictionary,
            casing: CasingMode::Plain,
            helper: None,
            fifo_mode: DEFAULT_FIFO_MODE,
        }
    }
}

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackState {
    Idle,
    Running,
    Succeeded,
    Exhausted,
    Aborted,
}

impl AttackState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttackState::Succeeded | AttackState::Exhausted | AttackState::Aborted
        )
    }
}

/// Terminal result of a run
#[derive(Debug)]
pub enum AttackOutcome {
    Success { username: String, password: String },
    Exhausted,
    Aborted(AttackError),
}

impl AttackOutcome {
    pub fn state(&self) -> AttackState {
        match self {
            AttackOutcome::Success { .. } => AttackState::Succeeded,
            AttackOutcome::Exhausted => AttackState::Exhausted,
            AttackOutcome::Aborted(_) => AttackState::Aborted,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttackOutcome::Success { .. })
    }
}

/// Shared cancellation flag (set from a Ctrl+C handler)
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Canceled)` once cancellation was requested
    pub fn check(&self) -> Result<(), AttackError> {
        if self.is_canceled() {
            Err(AttackError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Outcome plus run statistics
#[derive(Debug)]
pub struct AttackSummary {
    pub outcome: AttackOutcome,
    pub entries_processed: u64,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl AttackSummary {
    pub fn attempts_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

/// Sequential dictionary attack against one account
pub struct AttackController<O: Oracle> {
    oracle: O,
    username: String,
    casing: CasingMode,
    cancel: CancelToken,
    state: AttackState,
    entries_processed: u64,
    attempts: u64,
}

impl<O: Oracle> AttackController<O> {
    pub fn new(oracle: O, username: impl Into<String>, casing: CasingMode) -> Self {
        Self {
            oracle,
            username: username.into(),
            casing,
            cancel: CancelToken::new(),
            state: AttackState::Idle,
            entries_processed: 0,
            attempts: 0,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> AttackState {
        self.state
    }

    /// Run the attack to a terminal state, reporting as one stage
    pub fn run<E, S>(mut self, entries: &[E], reporter: &mut Reporter<S>) -> AttackSummary
    where
        E: AsRef<str>,
        S: StageSink,
    {
        let start = Instant::now();
        let total = entries.len() as u64;
        let mut stage = reporter.stage(ATTACK_STAGE);

        self.transition(AttackState::Running);
        log::info!(
            "Attacking user {} with {} entries (casing {})",
            self.username,
            total,
            self.casing.label()
        );

        let outcome = self.drive(entries, |current| stage.progress(current, total));
        self.transition(outcome.state());

        match &outcome {
            AttackOutcome::Success { .. } => stage.succeed(),
            AttackOutcome::Exhausted => stage.fail("Dictionary exhausted"),
            AttackOutcome::Aborted(err) => stage.fail(err.to_string()),
        }

        AttackSummary {
            outcome,
            entries_processed: self.entries_processed,
            attempts: self.attempts,
            elapsed: start.elapsed(),
        }
    }

    fn drive<E: AsRef<str>>(
        &mut self,
        entries: &[E],
        mut on_entry_done: impl FnMut(u64),
    ) -> AttackOutcome {
        for entry in entries {
            for candidate in candidates(entry.as_ref(), self.casing) {
                if self.cancel.is_canceled() {
                    return AttackOutcome::Aborted(AttackError::Canceled);
                }

                self.attempts += 1;
                log::debug!("Attempt #{}", self.attempts);

                match self.oracle.attempt(&self.username, &candidate) {
                    Ok(true) => {
                        return AttackOutcome::Success {
                            username: self.username.clone(),
                            password: candidate,
                        }
                    }
                    Ok(false) => {}
                    Err(err) => return AttackOutcome::Aborted(err),
                }
            }

            self.entries_processed += 1;
            on_entry_done(self.entries_processed);
        }

        AttackOutcome::Exhausted
    }

    fn transition(&mut self, next: AttackState) {
        log::debug!("Attack state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
