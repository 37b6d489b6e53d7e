use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::food::api::NutritionAnalyzer;
use crate::food::handoff::{self, Navigator};
use crate::food::models::{
    AnalysisOutcome, AnalysisProgressState, CapturedImage, FailureReason, NutritionRecord,
};

pub const ANALYSIS_STEPS: [&str; 5] = [
    "Analyzing image quality...",
    "Identifying food items...",
    "Calculating nutritional values...",
    "Generating health insights...",
    "Finalizing results...",
];

pub const LAST_STEP: usize = ANALYSIS_STEPS.len() - 1;
pub const MAX_PERCENT: u8 = 100;

/// Cadence of the cosmetic progress indicators. Purely visual: none of
/// these values affect when the real analysis finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTiming {
    pub step_interval: Duration,
    pub percent_interval: Duration,
    pub percent_increment: u8,
}

impl Default for ProgressTiming {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(900),
            percent_interval: Duration::from_millis(45),
            percent_increment: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerPhase {
    Running,
    Handoff(NutritionRecord),
    Error(FailureReason),
    TornDown,
}

impl ControllerPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ControllerPhase::Running)
    }
}

// Lifecycle; whichever of completion and teardown moves out of RUNNING first wins
const RUNNING: u8 = 0;
const DELIVERED: u8 = 1;
const TORN_DOWN: u8 = 2;

/// Drives the analysis screen: cosmetic step/percent timers racing one
/// real analyzer call, reconciled into a single navigation.
///
/// Dropping the controller tears it down.
pub struct AnalysisProgressController {
    progress_rx: watch::Receiver<AnalysisProgressState>,
    phase_tx: Arc<watch::Sender<ControllerPhase>>,
    phase_rx: watch::Receiver<ControllerPhase>,
    lifecycle: Arc<AtomicU8>,
    task: Option<JoinHandle<()>>,
}

impl AnalysisProgressController {
    /// Spawns the controller task on the current tokio runtime.
    pub fn start(
        image: Option<CapturedImage>,
        analyzer: Arc<dyn NutritionAnalyzer>,
        navigator: Arc<dyn Navigator>,
        timing: ProgressTiming,
    ) -> Self {
        let (progress_tx, progress_rx) = watch::channel(AnalysisProgressState::default());
        let (phase_tx, phase_rx) = watch::channel(ControllerPhase::Running);
        let phase_tx = Arc::new(phase_tx);
        let lifecycle = Arc::new(AtomicU8::new(RUNNING));

        let run = Reconciler {
            analyzer,
            navigator,
            timing,
            progress_tx,
            phase_tx: phase_tx.clone(),
            lifecycle: lifecycle.clone(),
        };
        let task = tokio::spawn(run.run(image));

        Self {
            progress_rx,
            phase_tx,
            phase_rx,
            lifecycle,
            task: Some(task),
        }
    }

    pub fn progress(&self) -> AnalysisProgressState {
        *self.progress_rx.borrow()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<AnalysisProgressState> {
        self.progress_rx.clone()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase_rx.borrow().clone()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ControllerPhase> {
        self.phase_rx.clone()
    }

    pub fn current_step_label(&self) -> &'static str {
        ANALYSIS_STEPS[self.progress().step_index.min(LAST_STEP)]
    }

    /// Resolves once the controller reaches a terminal phase.
    pub async fn wait(&self) -> ControllerPhase {
        let mut rx = self.phase_rx.clone();
        loop {
            let phase = rx.borrow_and_update().clone();
            if phase.is_terminal() {
                return phase;
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    /// Cancels the timers and abandons any in-flight analysis. Nothing is
    /// delivered to the navigator afterwards. Idempotent.
    pub fn teardown(&mut self) {
        if self
            .lifecycle
            .compare_exchange(RUNNING, TORN_DOWN, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Analysis controller torn down before completion");
            self.phase_tx.send_replace(ControllerPhase::TornDown);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for AnalysisProgressController {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct Reconciler {
    analyzer: Arc<dyn NutritionAnalyzer>,
    navigator: Arc<dyn Navigator>,
    timing: ProgressTiming,
    progress_tx: watch::Sender<AnalysisProgressState>,
    phase_tx: Arc<watch::Sender<ControllerPhase>>,
    lifecycle: Arc<AtomicU8>,
}

impl Reconciler {
    async fn run(self, image: Option<CapturedImage>) {
        let image = match validate(image) {
            Ok(image) => image,
            Err((uri, reason)) => {
                warn!("Rejecting analysis input: {}", reason);
                self.finish(&uri, AnalysisOutcome::Failure(reason));
                return;
            }
        };

        let analysis = self.analyzer.analyze(&image);
        let cosmetic = cosmetic_progress(self.timing, &self.progress_tx);
        tokio::pin!(analysis);
        tokio::pin!(cosmetic);
        let mut cosmetic_done = false;

        let outcome = loop {
            tokio::select! {
                biased;
                result = &mut analysis => {
                    break match result {
                        Ok(record) => AnalysisOutcome::Success(record),
                        Err(e) => {
                            warn!("Analysis of {} failed: {}", image.uri, e);
                            AnalysisOutcome::Failure(e.into())
                        }
                    };
                }
                _ = &mut cosmetic, if !cosmetic_done => {
                    debug!("Cosmetic progress complete, still waiting on analysis");
                    cosmetic_done = true;
                }
            }
        };

        self.finish(&image.uri, outcome);
    }

    fn finish(&self, image_uri: &str, outcome: AnalysisOutcome) {
        if self
            .lifecycle
            .compare_exchange(RUNNING, DELIVERED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Discarding outcome for {}: controller already torn down", image_uri);
            return;
        }

        let phase = match &outcome {
            AnalysisOutcome::Success(record) => ControllerPhase::Handoff(record.clone()),
            AnalysisOutcome::Failure(reason) => ControllerPhase::Error(reason.clone()),
        };
        handoff::deliver(self.navigator.as_ref(), image_uri, &outcome);
        self.phase_tx.send_replace(phase);
    }
}

fn validate(image: Option<CapturedImage>) -> Result<CapturedImage, (String, FailureReason)> {
    match image {
        None => Err((
            String::new(),
            FailureReason::InvalidImage("no image provided".to_string()),
        )),
        Some(image) if image.local_path().is_none() => {
            let reason = FailureReason::InvalidImage(format!("unusable uri '{}'", image.uri));
            Err((image.uri, reason))
        }
        Some(image) => Ok(image),
    }
}

async fn cosmetic_progress(timing: ProgressTiming, tx: &watch::Sender<AnalysisProgressState>) {
    future::join(
        step_timer(timing.step_interval, tx),
        percent_timer(timing.percent_interval, timing.percent_increment, tx),
    )
    .await;
}

async fn step_timer(period: Duration, tx: &watch::Sender<AnalysisProgressState>) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let mut at_end = false;
        tx.send_modify(|state| {
            if state.step_index < LAST_STEP {
                state.step_index += 1;
            }
            at_end = state.step_index >= LAST_STEP;
        });
        if at_end {
            return;
        }
    }
}

async fn percent_timer(period: Duration, increment: u8, tx: &watch::Sender<AnalysisProgressState>) {
    let increment = increment.max(1);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let mut at_end = false;
        tx.send_modify(|state| {
            state.percent = state.percent.saturating_add(increment).min(MAX_PERCENT);
            at_end = state.percent >= MAX_PERCENT;
        });
        if at_end {
            return;
        }
    }
}
