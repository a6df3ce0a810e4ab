mod theme;
mod top_panel;
mod history_panel;
mod landing_view;
mod generator_view;

pub use top_panel::TopPanel;
pub use history_panel::HistoryPanel;
pub use landing_view::LandingView;
pub use generator_view::GeneratorView;

use std::sync::Arc;
use egui::Context;
use log::warn;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use wwc_core::{GenerationState, HistoryState, Screen, Session};
use crate::events::{AppEvent, WwcEvent};
use crate::gfx::GfxState;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Proceed,
    Back,

    // Generator
    Generate,
    Retry,
    Download,
    DismissNotice,

    // History
    RefreshHistory,
    OpenRecord(String),
}

/// Per-frame snapshot of everything the components render from.
pub struct UiContext {
    pub screen: Screen,
    pub generation: GenerationState,
    pub history: HistoryState,
    pub notice: Option<String>,
    pub backend_url: String,
    pub event_loop_proxy: Arc<EventLoopProxy<WwcEvent>>,
}

impl UiContext {
    pub fn new(event_loop_proxy: Arc<EventLoopProxy<WwcEvent>>, backend_url: String) -> Self {
        Self {
            screen: Screen::default(),
            generation: GenerationState::Idle,
            history: HistoryState::default(),
            notice: None,
            backend_url,
            event_loop_proxy,
        }
    }

    pub fn send_event(&self, event: UiEvent) {
        if self.event_loop_proxy.send_event(WwcEvent::Ui(event)).is_err() {
            warn!("Event loop closed, dropping ui event");
        }
    }

    pub fn sync(&mut self, session: &Session) {
        self.screen = session.screen();
        match session.generator() {
            Some(generator) => {
                self.generation = generator.state().clone();
                self.history = generator.history().clone();
            }
            None => {
                self.generation = GenerationState::Idle;
                self.history = HistoryState::NotLoaded;
            }
        }
    }
}

pub struct UiState {
    pub(crate) egui_state: egui_winit::State,
    pub(crate) egui_ctx: egui::Context,
    pub(crate) egui_renderer: egui_wgpu::Renderer,

    components: Vec<Box<dyn UiComponent>>,
    pub(crate) ui_ctx: UiContext,
}

impl UiState {
    pub fn new(
        gfx: &GfxState,
        window: Arc<Window>,
        event_loop_proxy: Arc<EventLoopProxy<WwcEvent>>,
        backend_url: String,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        theme::apply(&egui_ctx);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gfx.device, gfx.config.format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            components: Vec::new(),
            ui_ctx: UiContext::new(event_loop_proxy, backend_url),
        }
    }

    pub fn draw(&mut self, window: &Window) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);

        self.egui_ctx.run(raw_input, |ctx| {
            for component in self.components.iter_mut() {
                component.show(ctx, &self.ui_ctx);
            }
        })
    }

    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }

    pub fn on_app_event(&mut self, event: &AppEvent) {
        for component in self.components.iter_mut() {
            component.on_app_event(event);
        }
    }
}

/// Panels are drawn in registration order, so side and bottom panels must be
/// added before anything that fills the central area.
pub trait UiComponent: Send + Sync {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext);

    fn on_app_event(&mut self, _event: &AppEvent) {}
}
