pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod payload;
pub mod session;

pub use api::{HttpBackend, InfographicApi, InfographicRecord};
pub use config::ClientConfig;
pub use controller::{EventSink, GeneratorController, GeneratorEvent, HistoryState};
pub use error::{ConfigError, GenerateError, PayloadError};
pub use generation::{Generation, GenerationState, ProgressSchedule, Ticket};
pub use payload::{ImagePayload, DOWNLOAD_FILE_NAME};
pub use session::{Screen, Session};
