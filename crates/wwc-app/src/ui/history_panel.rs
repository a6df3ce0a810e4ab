use egui::{Color32, Context, RichText, Ui};
use wwc_core::{HistoryState, InfographicRecord, Screen};
use crate::ui::theme::{ERROR_RED, VISA_BLUE};
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct HistoryPanel;

impl HistoryPanel {
    fn show_record(ui: &mut Ui, ui_ctx: &UiContext, record: &InfographicRecord) {
        egui::Frame::new()
            .fill(Color32::from_gray(245))
            .corner_radius(egui::CornerRadius::same(5))
            .inner_margin(egui::Margin::same(8))
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(210)))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("🖼").size(20.0).color(VISA_BLUE));

                    ui.vertical(|ui| {
                        ui.label(RichText::new(record.timestamp.format("%Y-%m-%d %H:%M UTC").to_string()).strong());
                        ui.label(RichText::new(&record.id).small().color(Color32::GRAY));
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let enabled = !ui_ctx.generation.is_loading();
                        if ui.add_enabled(enabled, egui::Button::new("Open")).clicked() {
                            ui_ctx.send_event(UiEvent::OpenRecord(record.id.clone()));
                        }
                    });
                });
            });

        ui.add_space(4.0);
    }
}

impl UiComponent for HistoryPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        if ui_ctx.screen != Screen::Generator {
            return;
        }

        egui::TopBottomPanel::bottom("history_panel")
            .resizable(true)
            .min_height(80.0)
            .max_height(280.0)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("🗂 Previous Infographics");
                    if let HistoryState::Loaded(records) = &ui_ctx.history {
                        ui.label(RichText::new(format!("({})", records.len())).color(Color32::GRAY));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let refreshing = matches!(ui_ctx.history, HistoryState::Loading);
                        if ui.add_enabled(!refreshing, egui::Button::new("🔄 Refresh")).clicked() {
                            ui_ctx.send_event(UiEvent::RefreshHistory);
                        }
                    });
                });
                ui.separator();

                match &ui_ctx.history {
                    HistoryState::NotLoaded => {}
                    HistoryState::Loading => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Loading…");
                        });
                    }
                    HistoryState::Failed(message) => {
                        ui.label(RichText::new(message).color(ERROR_RED));
                    }
                    HistoryState::Loaded(records) if records.is_empty() => {
                        ui.label(RichText::new("Nothing generated yet.").color(Color32::GRAY));
                    }
                    HistoryState::Loaded(records) => {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            // newest first
                            for record in records.iter().rev() {
                                Self::show_record(ui, ui_ctx, record);
                            }
                        });
                    }
                }
            });
    }
}
