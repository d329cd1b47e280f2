// Job controller: accepts simulation requests, owns the cancellation flag,
// dispatches the Monte Carlo driver onto a blocking worker, and streams
// tagged events back over a channel. At most one job is active; submitting
// while running cancels and replaces.
//
// The worker and the controller share exactly two things: the cache behind
// one mutex, and the cancellation flag. Everything else travels by message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task;

use crate::engine::cache::ResultCache;
use crate::engine::request::SimRequest;
use crate::error::EngineError;
use crate::models::driver::{self, ProgressSnapshot, SimResult};

pub type JobId = u64;

#[derive(Debug, Clone)]
pub enum JobEvent {
    Progress(ProgressSnapshot),
    Complete(SimResult),
    Error(String),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Complete,
    Cancelled,
    Error,
}

struct ActiveJob {
    id: JobId,
    cancel: Arc<AtomicBool>,
    state: Arc<Mutex<JobState>>,
    events: Option<UnboundedReceiver<JobEvent>>,
}

pub struct JobController {
    cache: Arc<Mutex<ResultCache>>,
    next_id: JobId,
    current: Option<ActiveJob>,
}

impl Default for JobController {
    fn default() -> Self {
        JobController::new()
    }
}

impl JobController {
    pub fn new() -> Self {
        JobController::with_cache(ResultCache::new())
    }

    pub fn with_cache(cache: ResultCache) -> Self {
        JobController {
            cache: Arc::new(Mutex::new(cache)),
            next_id: 0,
            current: None,
        }
    }

    /// Submit a request. Any running job is cancelled and replaced. Returns
    /// the new job id; consume its events via `events()`.
    ///
    /// Must be called from within a tokio runtime (the worker runs on the
    /// blocking pool).
    pub fn submit(&mut self, request: SimRequest) -> Result<JobId, EngineError> {
        request.validate()?;
        let inputs = request.build_inputs()?;
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let (tx, rx): (UnboundedSender<JobEvent>, UnboundedReceiver<JobEvent>) =
            mpsc::unbounded_channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let fingerprint = request.fingerprint();

        // Fingerprint lookup first: a fresh-enough result completes the job
        // without touching the worker pool.
        if let Some(result) = self.cache.lock().unwrap().get(&fingerprint) {
            debug!("job {}: cache hit on {}", id, fingerprint);
            let state = Arc::new(Mutex::new(JobState::Complete));
            let _ = tx.send(JobEvent::Complete(result));
            self.current = Some(ActiveJob {
                id,
                cancel,
                state,
                events: Some(rx),
            });
            return Ok(id);
        }

        let seed = request.config.base_seed.unwrap_or_else(wall_clock_seed);
        info!(
            "job {}: simulating {} ({} paths, seed {})",
            id, fingerprint, request.config.n_paths, seed
        );

        let state = Arc::new(Mutex::new(JobState::Running));
        let worker_state = Arc::clone(&state);
        let worker_cancel = Arc::clone(&cancel);
        let worker_cache = Arc::clone(&self.cache);
        let config = request.config.clone();
        let target = request.target;

        // Detached worker; its lifecycle is observed through the channel.
        let _worker = task::spawn_blocking(move || {
            let progress_tx = tx.clone();
            let outcome = driver::run_simulation(
                &inputs,
                target,
                &config,
                seed,
                &worker_cancel,
                |snapshot| {
                    let _ = progress_tx.send(JobEvent::Progress(snapshot));
                },
            );
            match outcome {
                Ok(result) => {
                    // Write-through strictly before the Complete event so a
                    // consumer that reacts to Complete always sees the
                    // cached entry.
                    worker_cache
                        .lock()
                        .unwrap()
                        .insert(fingerprint, result.clone());
                    *worker_state.lock().unwrap() = JobState::Complete;
                    let _ = tx.send(JobEvent::Complete(result));
                }
                Err(EngineError::Cancelled) => {
                    *worker_state.lock().unwrap() = JobState::Cancelled;
                    let _ = tx.send(JobEvent::Cancelled);
                }
                Err(err) => {
                    *worker_state.lock().unwrap() = JobState::Error;
                    let _ = tx.send(JobEvent::Error(err.to_string()));
                }
            }
        });

        self.current = Some(ActiveJob {
            id,
            cancel,
            state,
            events: Some(rx),
        });
        Ok(id)
    }

    /// Raise the cancellation flag on the active job. The worker observes
    /// it at the next batch boundary; progress already emitted stands.
    pub fn cancel(&mut self) {
        if let Some(job) = &self.current {
            if *job.state.lock().unwrap() == JobState::Running {
                info!("job {}: cancellation requested", job.id);
                job.cancel.store(true, Ordering::Relaxed);
            }
        }
    }

    /// Take the event stream for a job. Yields `None` for unknown ids or
    /// when the stream was already taken.
    pub fn events(&mut self, id: JobId) -> Option<UnboundedReceiver<JobEvent>> {
        match &mut self.current {
            Some(job) if job.id == id => job.events.take(),
            _ => None,
        }
    }

    /// Current state of a job; `None` once a newer submit replaced it.
    pub fn state(&self, id: JobId) -> Option<JobState> {
        match &self.current {
            Some(job) if job.id == id => Some(*job.state.lock().unwrap()),
            _ => None,
        }
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
