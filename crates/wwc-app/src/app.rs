use std::sync::Arc;
use std::time::Instant;
use log::error;
use winit::{
    event::*,
    event_loop::ActiveEventLoop,
};
use winit::application::ApplicationHandler;
use winit::event_loop::{ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{WindowAttributes, WindowId};
use wwc_core::ClientConfig;
use crate::events::WwcEvent;
use crate::state::AppState;

pub struct App {
    event_loop_proxy: Arc<EventLoopProxy<WwcEvent>>,
    config: ClientConfig,
    state: Option<AppState>,
    needs_redraw: bool,
}

impl App {
    pub fn new(event_loop: &EventLoop<WwcEvent>, config: ClientConfig) -> Self {
        let event_loop_proxy = Arc::new(event_loop.create_proxy());

        Self {
            event_loop_proxy,
            config,
            state: None,
            needs_redraw: false,
        }
    }
}

impl ApplicationHandler<WwcEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title("Visa Women's World Cup Infographic")
            .with_inner_size(winit::dpi::LogicalSize::new(1100.0, 900.0));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(AppState::new(window, self.event_loop_proxy.clone(), self.config.clone())) {
            Ok(state) => {
                self.state = Some(state);
                self.needs_redraw = true;
            }
            Err(e) => {
                error!("Failed to initialise graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: WwcEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WwcEvent::Ui(e) => state.on_ui_event(e),
            WwcEvent::App(e) => state.on_app_event(e),
            WwcEvent::Gen(e) => state.on_gen_event(e),
        }

        self.needs_redraw = true;
        state.window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        if state.window.id() != window_id {
            return;
        }

        // Let egui handle the event first
        let response = state.ui.egui_state.on_window_event(&state.window, &event);

        if response.repaint {
            self.needs_redraw = true;
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                state.resize(physical_size);
                self.needs_redraw = true;
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.render() {
                    error!("Render failed: {e:#}");
                }
                self.needs_redraw = false;
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };

        if self.needs_redraw {
            state.window.request_redraw();
            return;
        }

        match state.repaint_at {
            Some(at) if at <= Instant::now() => {
                state.window.request_redraw();
            }
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
