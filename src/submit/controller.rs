use crate::draw::surface::Surface;
use crate::submit::client::{CalculateRequest, Evaluator};
use crate::submit::response::{GeneratedResult, ResponseEntry};
use crate::submit::vars::VariableDictionary;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed {
        generation: u64,
        entries: Vec<ResponseEntry>,
    },
    Failed {
        generation: u64,
        error: String,
    },
}

impl SubmitOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            SubmitOutcome::Completed { generation, .. }
            | SubmitOutcome::Failed { generation, .. } => *generation,
        }
    }
}

/// Contents of the result slot after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    pub generation: u64,
    pub answers: Vec<GeneratedResult>,
}

impl Calculation {
    pub fn primary(&self) -> Option<&GeneratedResult> {
        self.answers.first()
    }
}

/// State the controller updates when an outcome is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    pub vars: VariableDictionary,
    pub result: Option<Calculation>,
}

/// Sends snapshots to the evaluator on worker threads and applies the
/// outcomes on the caller's thread.
///
/// Every submission is sent. Outcomes older than the last applied one are
/// dropped so an overlapping slow response cannot overwrite a newer result.
pub struct SubmissionController {
    evaluator: Arc<dyn Evaluator>,
    outcome_tx: Sender<SubmitOutcome>,
    outcome_rx: Receiver<SubmitOutcome>,
    next_generation: u64,
    last_applied: u64,
    in_flight: usize,
    waker: Option<Waker>,
}

impl SubmissionController {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        let (outcome_tx, outcome_rx) = channel();
        Self {
            evaluator,
            outcome_tx,
            outcome_rx,
            next_generation: 1,
            last_applied: 0,
            in_flight: 0,
            waker: None,
        }
    }

    /// Called from the worker thread after an outcome has been queued.
    pub fn set_waker(&mut self, waker: Option<Waker>) {
        self.waker = waker;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn reset(&self, surface: &mut Surface) {
        surface.clear();
    }

    /// Returns the generation of the dispatched request, or `None` when the
    /// surface has nothing to snapshot or the worker could not be started.
    pub fn submit(&mut self, surface: &Surface, vars: &VariableDictionary) -> Option<u64> {
        let Some(snapshot) = surface.snapshot() else {
            tracing::warn!("submit requested without a mounted surface");
            return None;
        };
        let generation = self.next_generation;
        let request = CalculateRequest {
            image: snapshot.to_data_uri(),
            dict_of_vars: vars.clone(),
        };

        let evaluator = Arc::clone(&self.evaluator);
        let tx = self.outcome_tx.clone();
        let waker = self.waker.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("sketch-submit-{generation}"))
            .spawn(move || {
                let outcome = match evaluator.evaluate(&request) {
                    Ok(entries) => SubmitOutcome::Completed {
                        generation,
                        entries,
                    },
                    Err(err) => SubmitOutcome::Failed {
                        generation,
                        error: format!("{err:#}"),
                    },
                };
                if tx.send(outcome).is_err() {
                    tracing::debug!(generation, "submission outcome discarded after teardown");
                    return;
                }
                if let Some(waker) = waker {
                    waker();
                }
            });

        match spawned {
            Ok(_) => {
                self.next_generation += 1;
                self.in_flight += 1;
                tracing::info!(
                    generation,
                    width = snapshot.width,
                    height = snapshot.height,
                    vars = vars.len(),
                    "submission dispatched"
                );
                Some(generation)
            }
            Err(err) => {
                tracing::error!(?err, "failed to start submission worker");
                None
            }
        }
    }

    /// Applies every queued outcome without blocking. Returns how many
    /// outcomes updated the state.
    pub fn pump(&mut self, state: &mut SubmissionState) -> usize {
        let mut applied = 0;
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    if self.apply(outcome, state) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Blocks until no submission is in flight or `timeout` elapses.
    pub fn pump_until_idle(&mut self, state: &mut SubmissionState, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = self.pump(state);
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(in_flight = self.in_flight, "timed out waiting for submissions");
                break;
            }
            match self.outcome_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    if self.apply(outcome, state) {
                        applied += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply(&mut self, outcome: SubmitOutcome, state: &mut SubmissionState) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            SubmitOutcome::Completed {
                generation,
                entries,
            } => {
                if generation <= self.last_applied {
                    tracing::debug!(
                        generation,
                        last_applied = self.last_applied,
                        "dropping stale submission outcome"
                    );
                    return false;
                }
                self.last_applied = generation;
                for entry in entries.iter().filter(|entry| entry.assign) {
                    state.vars.assign(&entry.expr, &entry.result);
                }
                let answers: Vec<GeneratedResult> =
                    entries.iter().map(GeneratedResult::from).collect();
                tracing::info!(generation, answers = answers.len(), "submission result applied");
                state.result = Some(Calculation {
                    generation,
                    answers,
                });
                true
            }
            SubmitOutcome::Failed { generation, error } => {
                tracing::error!(generation, error = %error, "submission failed");
                false
            }
        }
    }
}
