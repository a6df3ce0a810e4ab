use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::error::GenerateError;
use crate::payload::ImagePayload;

pub const PREPARING_MESSAGE: &str = "Preparing…";

/// Identifies one background request: an entry into the loading state or a
/// history fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Unique for the lifetime of the process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    Idle,
    Loading { ticket: Ticket, message: String },
    Error { message: String },
    Ready { image: ImagePayload },
}

impl GenerationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Self::Loading { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Error { .. } => "error",
            Self::Ready { .. } => "ready",
        }
    }
}

/// Cosmetic progress messages, each shown once its delay (measured from the
/// start of the request) has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSchedule {
    steps: Vec<(Duration, String)>,
}

impl Default for ProgressSchedule {
    fn default() -> Self {
        Self::new([
            (Duration::from_secs(2), "Generating infographic design…"),
            (Duration::from_secs(5), "Adding text and graphics…"),
            (Duration::from_secs(10), "Almost done, finalizing your infographic…"),
        ])
    }
}

impl ProgressSchedule {
    pub fn new<S: Into<String>>(steps: impl IntoIterator<Item = (Duration, S)>) -> Self {
        let mut steps: Vec<(Duration, String)> = steps
            .into_iter()
            .map(|(after, message)| (after, message.into()))
            .collect();
        steps.sort_by_key(|(after, _)| *after);
        Self { steps }
    }

    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[(Duration, String)] {
        &self.steps
    }
}

/// Request lifecycle: `Idle -> Loading -> {Ready | Error}`, and back to
/// `Loading` from either terminal state.
#[derive(Debug)]
pub struct Generation {
    state: GenerationState,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
        }
    }
}

impl Generation {
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Enters `Loading`, dropping any previous result or error.
    /// Returns `None` while a generation is already in flight.
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.is_loading() {
            debug!("Ignoring generate request, already loading");
            return None;
        }

        let ticket = Ticket::next();
        self.state = GenerationState::Loading {
            ticket,
            message: PREPARING_MESSAGE.to_string(),
        };
        Some(ticket)
    }

    /// Applies a progress message for the active ticket. Anything else is stale.
    pub fn progress(&mut self, ticket: Ticket, message: &str) -> bool {
        match &mut self.state {
            GenerationState::Loading { ticket: active, message: current } if *active == ticket => {
                *current = message.to_string();
                true
            }
            _ => false,
        }
    }

    /// Moves the active ticket to its terminal state.
    pub fn finish(&mut self, ticket: Ticket, outcome: Result<ImagePayload, GenerateError>) -> bool {
        if self.state.ticket() != Some(ticket) {
            debug!("Dropping outcome of stale generation {}", ticket.id());
            return false;
        }

        self.state = match outcome {
            Ok(image) => GenerationState::Ready { image },
            Err(e) => GenerationState::Error {
                message: e.user_message(),
            },
        };
        true
    }

    /// Shows an already generated image. Refused while loading.
    pub fn show(&mut self, image: ImagePayload) -> bool {
        if self.is_loading() {
            return false;
        }
        self.state = GenerationState::Ready { image };
        true
    }

    /// The held image, only in the `Ready` state.
    pub fn payload(&self) -> Option<&ImagePayload> {
        match &self.state {
            GenerationState::Ready { image } => Some(image),
            _ => None,
        }
    }
}
