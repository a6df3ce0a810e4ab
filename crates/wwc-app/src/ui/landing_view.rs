use egui::{Color32, Context, RichText, Ui};
use wwc_core::Screen;
use crate::ui::theme::{VISA_BLUE, VISA_GOLD, VISA_NAVY};
use crate::ui::{UiComponent, UiContext, UiEvent};

const KEY_FACTS: [(&str, &str, &str); 3] = [
    ("💰", "$500,000", "Total funding for women-owned small businesses"),
    ("⚽", "64", "Match grants, one per Women's World Cup match"),
    ("🏆", "$5,000 – $50,000", "From the group stage up to the final"),
];

#[derive(Default)]
pub struct LandingView;

impl LandingView {
    fn fact_card(ui: &mut Ui, icon: &str, value: &str, caption: &str) {
        egui::Frame::new()
            .fill(Color32::WHITE)
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::same(14))
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(220)))
            .show(ui, |ui| {
                ui.set_width(200.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(icon).size(28.0));
                    ui.label(RichText::new(value).size(22.0).strong().color(VISA_BLUE));
                    ui.label(RichText::new(caption).small().color(Color32::DARK_GRAY));
                });
            });
    }
}

impl UiComponent for LandingView {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        if ui_ctx.screen != Screen::Landing {
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(32.0);
                ui.label(RichText::new("Visa Women's World Cup 2023").size(34.0).strong().color(VISA_NAVY));
                ui.label(RichText::new("Small Business Grant Program").size(22.0).color(VISA_BLUE));
                ui.add_space(24.0);

                ui.horizontal(|ui| {
                    // horizontal layouts don't center, so pad by hand
                    let row_width = KEY_FACTS.len() as f32 * 240.0;
                    ui.add_space(((ui.available_width() - row_width) / 2.0).max(0.0));
                    for (icon, value, caption) in KEY_FACTS {
                        Self::fact_card(ui, icon, value, caption);
                        ui.add_space(12.0);
                    }
                });

                ui.add_space(20.0);
                ui.label("One grant per match, awarded in the home country of the Player of the Match.");
                ui.label("🇨🇦 In Canada, delivered with the Canadian Council for Aboriginal Business (CCAB),");
                ui.label("supporting Indigenous women entrepreneurs in line with Visa's She's Next program.");
                ui.add_space(32.0);

                let button = egui::Button::new(
                    RichText::new("Create Infographic").size(20.0).strong().color(VISA_NAVY)
                )
                .fill(VISA_GOLD)
                .min_size(egui::vec2(240.0, 48.0));

                if ui.add(button).clicked() {
                    ui_ctx.send_event(UiEvent::Proceed);
                }
            });
        });
    }
}
