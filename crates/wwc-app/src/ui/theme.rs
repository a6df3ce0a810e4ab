use egui::{Color32, Context, Visuals};
use wwc_core::GenerationState;

pub const VISA_BLUE: Color32 = Color32::from_rgb(0x14, 0x34, 0xCB);
pub const VISA_NAVY: Color32 = Color32::from_rgb(0x1A, 0x1F, 0x71);
pub const VISA_GOLD: Color32 = Color32::from_rgb(0xFF, 0xD7, 0x00);
pub const ERROR_RED: Color32 = Color32::from_rgb(0xC6, 0x28, 0x28);
pub const ERROR_FILL: Color32 = Color32::from_rgb(0xFD, 0xEC, 0xEC);
pub const ONLINE_GREEN: Color32 = Color32::from_rgb(0x2E, 0x7D, 0x32);

pub fn apply(ctx: &Context) {
    let mut visuals = Visuals::light();
    visuals.hyperlink_color = VISA_BLUE;
    visuals.selection.bg_fill = VISA_BLUE;
    visuals.widgets.active.bg_fill = VISA_BLUE;
    ctx.set_visuals(visuals);
}

pub fn state_icon(state: &GenerationState) -> &'static str {
    match state {
        GenerationState::Idle => "🎨",
        GenerationState::Loading { .. } => "⏳",
        GenerationState::Error { .. } => "⚠",
        GenerationState::Ready { .. } => "✅",
    }
}

pub fn state_color(state: &GenerationState) -> Color32 {
    match state {
        GenerationState::Idle => VISA_NAVY,
        GenerationState::Loading { .. } => VISA_BLUE,
        GenerationState::Error { .. } => ERROR_RED,
        GenerationState::Ready { .. } => ONLINE_GREEN,
    }
}
