use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{InfographicApi, InfographicRecord};
use crate::error::{GenerateError, PayloadError};
use crate::generation::{Generation, GenerationState, ProgressSchedule, Ticket};
use crate::payload::ImagePayload;

/// Results of background work, delivered back to the owner of the controller.
#[derive(Debug, Clone)]
pub enum GeneratorEvent {
    Progress {
        ticket: Ticket,
        message: String,
    },
    Finished {
        ticket: Ticket,
        outcome: Result<ImagePayload, GenerateError>,
    },
    HistoryLoaded {
        fetch: Ticket,
        result: Result<Vec<InfographicRecord>, GenerateError>,
    },
}

/// Where background tasks post their events. The UI forwards them to its
/// event loop; tests collect them in a channel.
pub type EventSink = Arc<dyn Fn(GeneratorEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum HistoryState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<InfographicRecord>),
    Failed(String),
}

/// One in-flight request plus its progress timers.
///
/// The timers stop as soon as the request settles, and the `Finished` event
/// is only posted after they have stopped. Dropping the task cancels both.
struct GenerationTask {
    cancel: CancellationToken,
    _request: JoinHandle<()>,
}

impl GenerationTask {
    fn spawn(
        api: Arc<dyn InfographicApi>,
        ticket: Ticket,
        schedule: ProgressSchedule,
        sink: EventSink,
    ) -> Self {
        let cancel = CancellationToken::new();

        let timers = tokio::spawn(run_progress(
            ticket,
            schedule,
            cancel.child_token(),
            sink.clone(),
        ));

        let request = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Generation {} cancelled", ticket.id());
                        return;
                    }
                    outcome = api.generate() => outcome,
                };

                cancel.cancel();
                if let Err(e) = timers.await {
                    warn!("Progress timers for generation {} failed: {}", ticket.id(), e);
                }

                match &outcome {
                    Ok(image) => info!("Generation {} succeeded: {:?}", ticket.id(), image),
                    Err(e) => warn!("Generation {} failed: {}", ticket.id(), e),
                }
                sink(GeneratorEvent::Finished { ticket, outcome });
            }
        });

        Self {
            cancel,
            _request: request,
        }
    }
}

impl Drop for GenerationTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_progress(
    ticket: Ticket,
    schedule: ProgressSchedule,
    cancel: CancellationToken,
    sink: EventSink,
) {
    let started = Instant::now();

    for (after, message) in schedule.steps() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep_until(started + *after) => {
                sink(GeneratorEvent::Progress {
                    ticket,
                    message: message.clone(),
                });
            }
        }
    }
}

/// Owns the generator screen's state and everything it has running.
pub struct GeneratorController {
    api: Arc<dyn InfographicApi>,
    sink: EventSink,
    schedule: ProgressSchedule,
    generation: Generation,
    task: Option<GenerationTask>,
    history: HistoryState,
    history_task: Option<JoinHandle<()>>,
    history_fetch: Option<Ticket>,
}

impl GeneratorController {
    pub fn new(api: Arc<dyn InfographicApi>, sink: EventSink, schedule: ProgressSchedule) -> Self {
        Self {
            api,
            sink,
            schedule,
            generation: Generation::default(),
            task: None,
            history: HistoryState::default(),
            history_task: None,
            history_fetch: None,
        }
    }

    pub fn state(&self) -> &GenerationState {
        self.generation.state()
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    /// Starts a new generation. Returns `None` if one is already running.
    pub fn generate(&mut self) -> Option<Ticket> {
        let ticket = self.generation.begin()?;
        info!("Starting generation {}", ticket.id());

        self.task = Some(GenerationTask::spawn(
            self.api.clone(),
            ticket,
            self.schedule.clone(),
            self.sink.clone(),
        ));
        Some(ticket)
    }

    /// Same as [`generate`](Self::generate); offered from the error state.
    pub fn retry(&mut self) -> Option<Ticket> {
        self.generate()
    }

    /// Same as [`generate`](Self::generate); offered from the result state.
    pub fn regenerate(&mut self) -> Option<Ticket> {
        self.generate()
    }

    pub fn handle(&mut self, event: GeneratorEvent) {
        match event {
            GeneratorEvent::Progress { ticket, message } => {
                if self.generation.progress(ticket, &message) {
                    debug!("Generation {}: {}", ticket.id(), message);
                }
            }
            GeneratorEvent::Finished { ticket, outcome } => {
                let succeeded = outcome.is_ok();
                if self.generation.finish(ticket, outcome) {
                    self.task = None;
                    if succeeded {
                        self.refresh_history();
                    }
                }
            }
            GeneratorEvent::HistoryLoaded { fetch, result } => {
                if self.history_fetch != Some(fetch) {
                    debug!("Ignoring stale history fetch {}", fetch.id());
                    return;
                }
                self.history_fetch = None;
                self.history_task = None;
                self.history = match result {
                    Ok(records) => HistoryState::Loaded(records),
                    Err(e) => {
                        warn!("Could not load infographic history: {}", e);
                        HistoryState::Failed(e.user_message())
                    }
                };
            }
        }
    }

    pub fn can_download(&self) -> bool {
        self.generation.payload().is_some()
    }

    /// Writes the current image to `path`. `Ok(false)` means there was
    /// nothing to download.
    pub fn download(&self, path: &Path) -> Result<bool, PayloadError> {
        let Some(image) = self.generation.payload() else {
            debug!("Nothing to download");
            return Ok(false);
        };

        image.save(path)?;
        info!("Saved infographic to {}", path.display());
        Ok(true)
    }

    pub fn refresh_history(&mut self) {
        if let Some(task) = self.history_task.take() {
            task.abort();
        }

        let fetch = Ticket::next();
        self.history_fetch = Some(fetch);
        self.history = HistoryState::Loading;
        let api = self.api.clone();
        let sink = self.sink.clone();
        self.history_task = Some(tokio::spawn(async move {
            let result = api.list_infographics().await;
            sink(GeneratorEvent::HistoryLoaded { fetch, result });
        }));
    }

    /// Shows a previously generated infographic from the loaded history.
    pub fn open_record(&mut self, id: &str) -> bool {
        let HistoryState::Loaded(records) = &self.history else {
            return false;
        };
        let Some(record) = records.iter().find(|r| r.id == id) else {
            warn!("Infographic {} is not in the loaded history", id);
            return false;
        };

        let payload = record.payload();
        self.generation.show(payload)
    }
}

impl Drop for GeneratorController {
    fn drop(&mut self) {
        if let Some(task) = self.history_task.take() {
            task.abort();
        }
    }
}
