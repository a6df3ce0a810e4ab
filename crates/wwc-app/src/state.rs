use std::sync::Arc;
use std::time::{Duration, Instant};
use egui_wgpu::wgpu;
use egui_wgpu::wgpu::StoreOp;
use log::{error, info, warn};
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use wwc_core::{
    ClientConfig, EventSink, GeneratorEvent, HttpBackend, InfographicApi, Session,
    DOWNLOAD_FILE_NAME,
};
use crate::events::{AppEvent, WwcEvent};
use crate::gfx::GfxState;
use crate::ui::{self, UiEvent, UiState};

pub struct AppState {
    pub window: Arc<Window>,
    pub gfx: GfxState,
    pub ui: UiState,
    session: Session,

    /// When egui next asked to be repainted, if ever.
    pub repaint_at: Option<Instant>,
}

impl AppState {
    pub async fn new(
        window: Arc<Window>,
        event_loop_proxy: Arc<EventLoopProxy<WwcEvent>>,
        config: ClientConfig,
    ) -> anyhow::Result<Self> {
        let gfx = GfxState::new(window.clone()).await?;

        let mut ui = UiState::new(&gfx, window.clone(), event_loop_proxy.clone(), config.backend_base_url.clone());
        ui.add_component(Box::new(ui::TopPanel::default()));
        ui.add_component(Box::new(ui::HistoryPanel::default()));
        ui.add_component(Box::new(ui::LandingView::default()));
        ui.add_component(Box::new(ui::GeneratorView::default()));

        info!("Backend at {}", config.backend_base_url);
        let api: Arc<dyn InfographicApi> = Arc::new(HttpBackend::new(config)?);

        let sink: EventSink = {
            let proxy = event_loop_proxy.clone();
            Arc::new(move |event: GeneratorEvent| {
                if proxy.send_event(WwcEvent::Gen(event)).is_err() {
                    warn!("Event loop closed, dropping generator event");
                }
            })
        };

        Self::probe_backend(api.clone(), event_loop_proxy);

        Ok(Self {
            window,
            gfx,
            ui,
            session: Session::new(api, sink),
            repaint_at: None,
        })
    }

    fn probe_backend(api: Arc<dyn InfographicApi>, proxy: Arc<EventLoopProxy<WwcEvent>>) {
        tokio::spawn(async move {
            let status = api.status().await.map_err(|e| e.user_message());
            match &status {
                Ok(message) => info!("Backend reachable: {message}"),
                Err(message) => warn!("Backend unreachable: {message}"),
            }
            if proxy.send_event(WwcEvent::App(AppEvent::BackendStatus(status))).is_err() {
                warn!("Event loop closed, dropping backend status");
            }
        });
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    pub fn on_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Proceed => {
                self.ui.ui_ctx.notice = None;
                self.session.proceed();
            }
            UiEvent::Back => {
                self.ui.ui_ctx.notice = None;
                self.session.back();
            }
            UiEvent::Generate => {
                if let Some(generator) = self.session.generator_mut() {
                    generator.regenerate();
                }
            }
            UiEvent::Retry => {
                if let Some(generator) = self.session.generator_mut() {
                    generator.retry();
                }
            }
            UiEvent::Download => self.download(),
            UiEvent::DismissNotice => self.ui.ui_ctx.notice = None,
            UiEvent::RefreshHistory => {
                if let Some(generator) = self.session.generator_mut() {
                    generator.refresh_history();
                }
            }
            UiEvent::OpenRecord(id) => {
                if let Some(generator) = self.session.generator_mut() {
                    if !generator.open_record(&id) {
                        self.ui.ui_ctx.notice = Some(format!("Infographic {id} is not available"));
                    }
                }
            }
        }

        self.ui.ui_ctx.sync(&self.session);
    }

    pub fn on_gen_event(&mut self, event: GeneratorEvent) {
        self.session.handle(event);
        self.ui.ui_ctx.sync(&self.session);
    }

    pub fn on_app_event(&mut self, event: AppEvent) {
        self.ui.on_app_event(&event);
    }

    fn download(&mut self) {
        let Some(generator) = self.session.generator() else {
            return;
        };
        if !generator.can_download() {
            self.ui.ui_ctx.notice = Some("Nothing to download yet".to_owned());
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(DOWNLOAD_FILE_NAME)
            .add_filter("PNG image", &["png"])
            .save_file()
        else {
            return;
        };

        self.ui.ui_ctx.notice = match generator.download(&path) {
            Ok(true) => Some(format!("Saved to {}", path.display())),
            Ok(false) => Some("Nothing to download yet".to_owned()),
            Err(e) => {
                error!("Failed to save {}: {e}", path.display());
                Some(format!("Could not save the infographic: {e}"))
            }
        };
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gfx.reconfigure();
                self.window.request_redraw();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder")
        });

        let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.96, g: 0.96, b: 0.97, a: 1.0 }),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        // UI
        let full_output = self.ui.draw(&self.window);

        let platform_output = full_output.platform_output.clone();
        self.ui.egui_state.handle_platform_output(&self.window, platform_output);

        // The spinner and progress text need frames while nothing else happens
        self.repaint_at = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map(|viewport| viewport.repaint_delay)
            .filter(|delay| *delay < Duration::MAX)
            .and_then(|delay| Instant::now().checked_add(delay));

        let pixels_per_point = full_output.pixels_per_point;
        let paint_jobs = self.ui.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.ui.egui_renderer.update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        let callback_buffers = self.ui.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &paint_jobs,
            &screen_desc,
        );

        {
            let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.ui.egui_renderer.render(&mut rpass.forget_lifetime(), &paint_jobs, &screen_desc);
        }

        for id in &full_output.textures_delta.free {
            self.ui.egui_renderer.free_texture(id);
        }

        self.gfx.queue.submit(callback_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}
