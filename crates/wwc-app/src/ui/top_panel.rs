use egui::{Color32, Context, RichText};
use crate::events::AppEvent;
use crate::ui::theme::{self, ERROR_RED, ONLINE_GREEN, VISA_GOLD};
use crate::ui::{UiComponent, UiContext};
use wwc_core::Screen;

#[derive(Debug, Clone, Default)]
enum BackendStatus {
    #[default]
    Checking,
    Online(String),
    Offline(String),
}

#[derive(Default)]
pub struct TopPanel {
    backend: BackendStatus,
}

impl UiComponent for TopPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::TopBottomPanel::top("top_panel")
            .frame(egui::Frame::new().fill(theme::VISA_BLUE).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("VISA").heading().strong().color(Color32::WHITE));
                    ui.label(RichText::new("Women's World Cup 2023").color(VISA_GOLD));

                    if ui_ctx.screen == Screen::Generator {
                        ui.separator();
                        ui.label(
                            RichText::new(theme::state_icon(&ui_ctx.generation))
                                .color(Color32::WHITE)
                        );
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (text, color) = match &self.backend {
                            BackendStatus::Checking => ("● checking".to_owned(), Color32::LIGHT_GRAY),
                            BackendStatus::Online(_) => ("● online".to_owned(), ONLINE_GREEN),
                            BackendStatus::Offline(_) => ("● offline".to_owned(), ERROR_RED),
                        };

                        let status = ui.label(RichText::new(text).color(color).strong());
                        let hover = match &self.backend {
                            BackendStatus::Checking => ui_ctx.backend_url.clone(),
                            BackendStatus::Online(message) | BackendStatus::Offline(message) =>
                                format!("{}\n{}", ui_ctx.backend_url, message),
                        };
                        status.on_hover_text(hover);
                    });
                });
            });
    }

    fn on_app_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::BackendStatus(Ok(message)) => self.backend = BackendStatus::Online(message.clone()),
            AppEvent::BackendStatus(Err(message)) => self.backend = BackendStatus::Offline(message.clone()),
        }
    }
}
