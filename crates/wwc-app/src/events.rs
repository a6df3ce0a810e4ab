use wwc_core::GeneratorEvent;
use crate::ui::UiEvent;

#[derive(Debug, Clone)]
pub enum WwcEvent {
    Ui(UiEvent),
    App(AppEvent),
    Gen(GeneratorEvent),
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Outcome of the startup reachability probe.
    BackendStatus(Result<String, String>),
}
