use std::sync::Arc;

use tracing::{debug, info};

use crate::api::InfographicApi;
use crate::controller::{EventSink, GeneratorController, GeneratorEvent};
use crate::generation::ProgressSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Landing,
    Generator,
}

/// Screen navigation. The generator controller only exists while its screen
/// is shown, so leaving the screen discards (and cancels) its state.
pub struct Session {
    screen: Screen,
    generator: Option<GeneratorController>,
    api: Arc<dyn InfographicApi>,
    sink: EventSink,
    schedule: ProgressSchedule,
}

impl Session {
    pub fn new(api: Arc<dyn InfographicApi>, sink: EventSink) -> Self {
        Self::with_schedule(api, sink, ProgressSchedule::default())
    }

    pub fn with_schedule(
        api: Arc<dyn InfographicApi>,
        sink: EventSink,
        schedule: ProgressSchedule,
    ) -> Self {
        Self {
            screen: Screen::Landing,
            generator: None,
            api,
            sink,
            schedule,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Landing -> Generator, with a fresh idle generator.
    pub fn proceed(&mut self) {
        if self.screen == Screen::Generator {
            return;
        }

        info!("Opening generator");
        let mut generator =
            GeneratorController::new(self.api.clone(), self.sink.clone(), self.schedule.clone());
        generator.refresh_history();

        self.generator = Some(generator);
        self.screen = Screen::Generator;
    }

    /// Generator -> Landing. Anything in flight is cancelled.
    pub fn back(&mut self) {
        if self.screen == Screen::Landing {
            return;
        }

        info!("Returning to landing page");
        self.generator = None;
        self.screen = Screen::Landing;
    }

    pub fn generator(&self) -> Option<&GeneratorController> {
        self.generator.as_ref()
    }

    pub fn generator_mut(&mut self) -> Option<&mut GeneratorController> {
        self.generator.as_mut()
    }

    pub fn handle(&mut self, event: GeneratorEvent) {
        match self.generator.as_mut() {
            Some(generator) => generator.handle(event),
            None => debug!("No generator open, dropping {:?}", event),
        }
    }
}
