use egui::{Color32, Context, RichText, TextureHandle, Ui};
use log::warn;
use wwc_core::{GenerationState, ImagePayload, Screen};
use crate::ui::theme::{self, ERROR_FILL, ERROR_RED, VISA_BLUE, VISA_GOLD, VISA_NAVY};
use crate::ui::{UiComponent, UiContext, UiEvent};

/// Decoded texture for the payload currently on screen.
struct Preview {
    payload: ImagePayload,
    texture: Result<TextureHandle, String>,
}

#[derive(Default)]
pub struct GeneratorView {
    preview: Option<Preview>,
}

impl GeneratorView {
    fn update_preview(&mut self, ctx: &Context, state: &GenerationState) {
        let GenerationState::Ready { image } = state else {
            self.preview = None;
            return;
        };

        if self.preview.as_ref().is_some_and(|p| p.payload.same_as(image)) {
            return;
        }

        let texture = image
            .decode_rgba()
            .map(|rgba| {
                let size = [rgba.width() as usize, rgba.height() as usize];
                let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                ctx.load_texture("wwc-infographic", pixels, egui::TextureOptions::LINEAR)
            })
            .map_err(|e| {
                warn!("Cannot display infographic: {e}");
                e.to_string()
            });

        self.preview = Some(Preview { payload: image.clone(), texture });
    }

    fn primary_button(ui: &mut Ui, text: &str) -> bool {
        let button = egui::Button::new(RichText::new(text).size(18.0).strong().color(VISA_NAVY))
            .fill(VISA_GOLD)
            .min_size(egui::vec2(200.0, 40.0));
        ui.add(button).clicked()
    }

    fn show_idle(ui: &mut Ui, ui_ctx: &UiContext) {
        ui.label("Generate a poster summarising the Visa Women's World Cup grant program.");
        ui.add_space(16.0);
        if Self::primary_button(ui, "🎨 Generate Infographic") {
            ui_ctx.send_event(UiEvent::Generate);
        }
    }

    fn show_loading(ui: &mut Ui, message: &str) {
        ui.add_space(24.0);
        ui.add(egui::Spinner::new().size(48.0).color(VISA_BLUE));
        ui.add_space(12.0);
        ui.label(RichText::new(message).size(18.0).color(VISA_NAVY));
        ui.label(RichText::new("This can take up to a minute.").small().color(Color32::GRAY));
    }

    fn show_error(ui: &mut Ui, ui_ctx: &UiContext, message: &str) {
        egui::Frame::new()
            .fill(ERROR_FILL)
            .corner_radius(egui::CornerRadius::same(6))
            .inner_margin(egui::Margin::same(12))
            .stroke(egui::Stroke::new(1.0, ERROR_RED))
            .show(ui, |ui| {
                ui.label(RichText::new("⚠ Generation failed").strong().color(ERROR_RED));
                ui.label(RichText::new(message).color(ERROR_RED));
            });

        ui.add_space(16.0);
        if Self::primary_button(ui, "Try Again") {
            ui_ctx.send_event(UiEvent::Retry);
        }
    }

    fn show_ready(&self, ui: &mut Ui, ui_ctx: &UiContext) {
        ui.horizontal(|ui| {
            if ui.button(RichText::new("⬇ Download").size(16.0)).clicked() {
                ui_ctx.send_event(UiEvent::Download);
            }
            if ui.button(RichText::new("🔄 Generate New").size(16.0)).clicked() {
                ui_ctx.send_event(UiEvent::Generate);
            }
        });
        ui.add_space(8.0);

        match self.preview.as_ref().map(|p| &p.texture) {
            Some(Ok(texture)) => {
                let size = texture.size_vec2();
                let available = ui.available_size();
                let scale = (available.x / size.x).min(available.y / size.y).min(1.0);
                let image = egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                    .fit_to_exact_size(size * scale);
                ui.add(image);
            }
            Some(Err(reason)) => {
                ui.label(RichText::new(format!("The image could not be displayed: {reason}")).color(ERROR_RED));
                ui.label("It can still be downloaded.");
            }
            None => {}
        }
    }

    fn show_notice(ui: &mut Ui, ui_ctx: &UiContext) {
        let Some(notice) = &ui_ctx.notice else {
            return;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new(notice).italics());
            if ui.small_button("✕").clicked() {
                ui_ctx.send_event(UiEvent::DismissNotice);
            }
        });
        ui.add_space(6.0);
    }
}

impl UiComponent for GeneratorView {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        if ui_ctx.screen != Screen::Generator {
            self.preview = None;
            return;
        }

        self.update_preview(ctx, &ui_ctx.generation);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("← Back").clicked() {
                    ui_ctx.send_event(UiEvent::Back);
                }
                ui.separator();
                ui.label(
                    RichText::new(theme::state_icon(&ui_ctx.generation))
                        .color(theme::state_color(&ui_ctx.generation))
                );
                ui.heading(RichText::new("Infographic Generator").color(VISA_NAVY));
            });
            ui.separator();
            Self::show_notice(ui, ui_ctx);

            ui.vertical_centered(|ui| match &ui_ctx.generation {
                GenerationState::Idle => Self::show_idle(ui, ui_ctx),
                GenerationState::Loading { message, .. } => Self::show_loading(ui, message),
                GenerationState::Error { message } => Self::show_error(ui, ui_ctx, message),
                GenerationState::Ready { .. } => self.show_ready(ui, ui_ctx),
            });
        });
    }
}
