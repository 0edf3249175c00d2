//! Entropy Arena entry point
//!
//! In the browser the arena takes over the page canvas. Natively there is no
//! window; the binary drives every scene headlessly with scripted pointer
//! input and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
    }
    log::info!("Entropy Arena starting...");

    if let Err(e) = entropy_arena::platform::web::run().await {
        log::error!("Arena failed to start: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Entropy Arena (native, headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("Headless run failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::f32::consts::TAU;

    use glam::Vec2;

    use entropy_arena::audio::AudioEngine;
    use entropy_arena::persistence::MemoryStore;
    use entropy_arena::platform::HeadlessPlatform;
    use entropy_arena::renderer::HeadlessSurface;
    use entropy_arena::sim::SceneKind;
    use entropy_arena::{
        ArenaError, ArenaSettings, PointerId, QualityPreset, ScoreStore, SimulationHost,
    };

    const WIDTH: u32 = 800;
    const HEIGHT: u32 = 600;
    /// Frames simulated per scene (ten seconds at 60 Hz)
    const FRAMES_PER_SCENE: u32 = 600;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run() -> Result<(), ArenaError> {
        let store = MemoryStore::new().shared();
        let mut settings = ArenaSettings::load(&store);
        // Optional first argument: low | medium | high
        if let Some(arg) = std::env::args().nth(1) {
            match QualityPreset::parse(&arg) {
                Some(quality) => settings.quality = quality,
                None => log::warn!(
                    "Unknown quality preset {:?}, keeping {}",
                    arg,
                    settings.quality.as_str()
                ),
            }
        }
        let scores = ScoreStore::new(store);
        let platform = HeadlessPlatform::new();

        let mut host = SimulationHost::new(
            Box::new(platform.clone()),
            AudioEngine::silent(),
            scores.clone(),
            settings,
            0x5eed,
        );
        host.enter(
            Box::new(HeadlessSurface::new(WIDTH, HEIGHT)),
            Box::new(|| log::info!("Exit callback fired")),
        )?;

        let center = Vec2::new(WIDTH as f32 * 0.5, HEIGHT as f32 * 0.5);
        let mut now = 0.0;
        for kind in SceneKind::ALL {
            host.switch_scene(kind);
            host.on_pointer_down(PointerId::Mouse, center);
            host.on_tap(center);

            for frame in 0..FRAMES_PER_SCENE {
                if platform.take_frame().is_none() {
                    break;
                }
                // Circle the center so every scene sees steady motion
                let angle = frame as f32 * 0.05;
                let pos = center + Vec2::new(angle.cos(), angle.sin()) * 180.0;
                host.on_pointer_move(PointerId::Mouse, pos);
                if frame % 120 == 60 {
                    host.on_tap(pos);
                }
                // Rotate a touch contact opposite to the mouse
                let back = TAU - angle;
                let touch = center + Vec2::new(back.cos(), back.sin()) * 90.0;
                if frame == 0 {
                    host.on_pointer_down(PointerId::Touch(1), touch);
                } else {
                    host.on_pointer_move(PointerId::Touch(1), touch);
                }

                now += FRAME_MS;
                host.frame(now);

                if frame % 120 == 0 {
                    if let Some(status) = host.status_line() {
                        log::info!("[{}] {}", kind.as_str(), status);
                    }
                }
            }

            host.on_pointer_up(PointerId::Mouse);
            host.on_pointer_cancel(PointerId::Touch(1));
            log::info!(
                "{} done: {} ticks, {} frames so far",
                kind.as_str(),
                host.ticks(),
                host.frames_rendered()
            );
        }

        host.exit();
        log::info!(
            "All-time high: {:.1} ({} faults)",
            scores.get(),
            host.faults()
        );
        Ok(())
    }
}
