mod app;
mod error;
mod events;
mod gfx;
mod state;
mod ui;

use std::error::Error;
use winit::event_loop::{ControlFlow, EventLoop};
use wwc_core::ClientConfig;
use crate::events::WwcEvent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::load()?;

    let event_loop: EventLoop<WwcEvent> = EventLoop::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(&event_loop, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
