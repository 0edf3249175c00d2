//! Browser platform: DOM listeners, requestAnimationFrame, WebGPU surface

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent,
    TouchEvent,
};

use super::{FrameHandle, Platform};
use crate::Bounds;
use crate::audio::web::WebAudioSink;
use crate::audio::{AudioEngine, AudioSink};
use crate::error::{ArenaError, RenderError};
use crate::highscores::ScoreStore;
use crate::host::SimulationHost;
use crate::input::PointerId;
use crate::persistence::{LocalStore, SharedStore};
use crate::renderer::{Canvas, Color, GpuSurface, RenderState, RenderSurface};
use crate::settings::ArenaSettings;

const CANVAS_ID: &str = "arena-canvas";
const OVERLAY_ID: &str = "arena-overlay";
const HUD_ID: &str = "arena-hud";
const EXIT_ID: &str = "arena-exit";
const RETRY_ID: &str = "arena-retry";
const ENTER_ID: &str = "arena-enter";
/// Master volume change per key press
const VOLUME_STEP: f32 = 0.1;

thread_local! {
    /// Keeps the host alive; every closure only holds a `Weak`
    static ARENA: RefCell<Option<Rc<RefCell<SimulationHost>>>> = const { RefCell::new(None) };
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

pub struct WebPlatform {
    host: Weak<RefCell<SimulationHost>>,
    canvas: HtmlCanvasElement,
    /// Where preference changes are written
    store: SharedStore,
    listeners: Vec<Listener>,
    /// Removed listeners; kept until the next attach because detaching can
    /// happen from inside one of them
    retired: Vec<Listener>,
    raf: Option<Closure<dyn FnMut(f64)>>,
}

impl WebPlatform {
    pub fn new(
        host: Weak<RefCell<SimulationHost>>,
        canvas: HtmlCanvasElement,
        store: SharedStore,
    ) -> Self {
        Self {
            host,
            canvas,
            store,
            listeners: Vec::new(),
            retired: Vec::new(),
            raf: None,
        }
    }

    fn listen<F>(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        mut handler: F,
    ) -> Result<(), ArenaError>
    where
        F: FnMut(&mut SimulationHost, web_sys::Event) + 'static,
    {
        let weak = self.host.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(host) = weak.upgrade() else { return };
            let Ok(mut host) = host.try_borrow_mut() else {
                return;
            };
            handler(&mut *host, event);
        });
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|e| ArenaError::Platform(format!("listen {}: {:?}", kind, e)))?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }
}

/// Client coordinates to canvas backing pixels
fn canvas_pos(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    Vec2::new(
        ((client_x - rect.left()) * dpr) as f32,
        ((client_y - rect.top()) * dpr) as f32,
    )
}

/// CSS size times the pixel ratio; zero while the canvas is not displayed
fn measure_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
    let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    (
        (canvas.client_width() as f64 * dpr) as u32,
        (canvas.client_height() as f64 * dpr) as u32,
    )
}

/// Size the canvas backing store to its measured size
fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
    let (width, height) = measure_canvas(canvas);
    canvas.set_width(width);
    canvas.set_height(height);
    (width, height)
}

/// Run `f` for every changed touch as (id, canvas position)
fn for_each_touch(
    canvas: &HtmlCanvasElement,
    event: &TouchEvent,
    mut f: impl FnMut(PointerId, Vec2),
) {
    let touches = event.changed_touches();
    for i in 0..touches.length() {
        if let Some(touch) = touches.get(i) {
            let pos = canvas_pos(canvas, touch.client_x() as f64, touch.client_y() as f64);
            f(PointerId::Touch(touch.identifier()), pos);
        }
    }
}

fn set_hud(text: Option<&str>) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = document.get_element_by_id(HUD_ID) {
        el.set_text_content(text);
    }
}

impl Platform for WebPlatform {
    fn attach_listeners(&mut self) -> Result<(), ArenaError> {
        self.retired.clear();
        let window = web_sys::window().ok_or_else(|| ArenaError::Platform("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ArenaError::Platform("no document".into()))?;
        let canvas: EventTarget = self.canvas.clone().into();

        // Mouse: the cursor is a pointer while it hovers the canvas
        let c = self.canvas.clone();
        self.listen(&canvas, "mousedown", move |host, event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                let pos = canvas_pos(&c, e.client_x() as f64, e.client_y() as f64);
                host.on_pointer_down(PointerId::Mouse, pos);
                host.on_tap(pos);
            }
        })?;
        let c = self.canvas.clone();
        self.listen(&canvas, "mousemove", move |host, event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                host.on_pointer_move(
                    PointerId::Mouse,
                    canvas_pos(&c, e.client_x() as f64, e.client_y() as f64),
                );
            }
        })?;
        self.listen(&canvas, "mouseleave", |host, _event| {
            host.on_pointer_up(PointerId::Mouse);
        })?;

        // Touch
        let c = self.canvas.clone();
        self.listen(&canvas, "touchstart", move |host, event| {
            if let Some(e) = event.dyn_ref::<TouchEvent>() {
                e.prevent_default();
                for_each_touch(&c, e, |id, pos| {
                    host.on_pointer_down(id, pos);
                    host.on_tap(pos);
                });
            }
        })?;
        let c = self.canvas.clone();
        self.listen(&canvas, "touchmove", move |host, event| {
            if let Some(e) = event.dyn_ref::<TouchEvent>() {
                e.prevent_default();
                for_each_touch(&c, e, |id, pos| host.on_pointer_move(id, pos));
            }
        })?;
        let c = self.canvas.clone();
        self.listen(&canvas, "touchend", move |host, event| {
            if let Some(e) = event.dyn_ref::<TouchEvent>() {
                for_each_touch(&c, e, |id, _| host.on_pointer_up(id));
            }
        })?;
        let c = self.canvas.clone();
        self.listen(&canvas, "touchcancel", move |host, event| {
            if let Some(e) = event.dyn_ref::<TouchEvent>() {
                for_each_touch(&c, e, |id, _| host.on_pointer_cancel(id));
            }
        })?;

        // Resize only measures; the backing store changes with the surface
        // when the host applies the size between ticks
        let c = self.canvas.clone();
        let window_target: EventTarget = window.clone().into();
        self.listen(&window_target, "resize", move |host, _event| {
            let (w, h) = measure_canvas(&c);
            host.on_resize(w, h);
        })?;

        let store = self.store.clone();
        self.listen(&window_target, "keydown", move |host, event| {
            let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            match e.key().as_str() {
                "Escape" => host.request_exit(),
                "r" | "R" => host.retry(),
                "n" | "N" => {
                    let next = host.scene_kind().next();
                    host.switch_scene(next);
                }
                "m" | "M" => {
                    host.toggle_mute();
                    host.settings().save(&store);
                }
                "+" | "=" | "-" => {
                    let step = if e.key() == "-" { -VOLUME_STEP } else { VOLUME_STEP };
                    let volume = host.settings().master_volume + step;
                    host.set_volume(volume);
                    host.settings().save(&store);
                }
                _ => {}
            }
        })?;

        if let Some(btn) = document.get_element_by_id(EXIT_ID) {
            let target: EventTarget = btn.into();
            self.listen(&target, "click", |host, event| {
                event.stop_propagation();
                host.request_exit();
            })?;
        }
        if let Some(btn) = document.get_element_by_id(RETRY_ID) {
            let target: EventTarget = btn.into();
            self.listen(&target, "click", |host, event| {
                event.stop_propagation();
                host.retry();
            })?;
        }

        log::debug!("Attached {} listeners", self.listeners.len());
        Ok(())
    }

    fn detach_listeners(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            );
            self.retired.push(listener);
        }
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        if self.raf.is_none() {
            let weak = self.host.clone();
            self.raf = Some(Closure::new(move |time: f64| {
                let Some(host) = weak.upgrade() else { return };
                let status = {
                    let Ok(mut host) = host.try_borrow_mut() else {
                        return;
                    };
                    host.frame(time);
                    host.status_line()
                };
                set_hud(status.as_deref());
            }));
        }
        let window = web_sys::window()?;
        let callback = self.raf.as_ref()?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
            .map(|id| FrameHandle(id as i64))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0 as i32);
        }
    }
}

fn css_color(color: Color) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {:.3})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// GPU surface plus an optional 2D canvas stacked on top for text labels
struct WebSurface {
    gpu: GpuSurface,
    canvas: HtmlCanvasElement,
    overlay: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
}

impl WebSurface {
    fn new(gpu: GpuSurface, canvas: HtmlCanvasElement) -> Self {
        let overlay = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(OVERLAY_ID))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .and_then(|canvas| {
                let ctx = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()?
                    .dyn_into::<CanvasRenderingContext2d>()
                    .ok()?;
                Some((canvas, ctx))
            });
        if overlay.is_none() {
            log::debug!("No #{} canvas; labels are not drawn", OVERLAY_ID);
        }
        let mut surface = Self {
            gpu,
            canvas,
            overlay,
        };
        let (w, h) = surface.gpu.size();
        surface.size_overlay(w, h);
        surface
    }

    fn size_overlay(&mut self, width: u32, height: u32) {
        if let Some((canvas, ctx)) = &self.overlay {
            canvas.set_width(width);
            canvas.set_height(height);
            ctx.set_font("bold 22px monospace");
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
        }
    }

    fn draw_labels(&self) {
        let Some((canvas, ctx)) = &self.overlay else {
            return;
        };
        ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
        for label in self.gpu.labels() {
            ctx.set_fill_style_str(&css_color(label.color));
            let _ = ctx.fill_text(&label.text, label.pos.x as f64, label.pos.y as f64);
        }
    }
}

impl RenderSurface for WebSurface {
    fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gpu.resize(width, height);
        self.size_overlay(width, height);
    }

    fn begin_frame(&mut self, bounds: Bounds) -> &mut dyn Canvas {
        self.gpu.begin_frame(bounds)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.gpu.present()?;
        self.draw_labels();
        Ok(())
    }
}

/// Build a WebGPU surface over the canvas
async fn gpu_surface(canvas: &HtmlCanvasElement) -> Result<GpuSurface, ArenaError> {
    let (width, height) = fit_canvas(canvas);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| RenderError::Other(format!("surface: {}", e)))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| RenderError::Other(format!("adapter: {}", e)))?;
    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let state = RenderState::new(surface, &adapter, width, height).await?;
    Ok(GpuSurface::new(state))
}

fn set_visible(id: &str, visible: bool) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
    }
}

/// Elements shown only while the arena runs
const ARENA_IDS: [&str; 3] = [CANVAS_ID, OVERLAY_ID, HUD_ID];

/// Show the arena elements and hide the enter button, or the reverse
fn show_arena(visible: bool) {
    for id in ARENA_IDS {
        set_visible(id, visible);
    }
    set_visible(ENTER_ID, !visible);
}

/// Create a surface and hand it to the host
async fn enter(
    host: Rc<RefCell<SimulationHost>>,
    canvas: HtmlCanvasElement,
) -> Result<(), ArenaError> {
    // A hidden canvas measures 0x0, so show it before sizing the surface
    show_arena(true);
    let surface = match gpu_surface(&canvas).await {
        Ok(surface) => surface,
        Err(e) => {
            show_arena(false);
            return Err(e);
        }
    };
    let on_exit = Box::new(|| {
        show_arena(false);
        log::info!("Arena closed by user");
    });
    let result = host
        .borrow_mut()
        .enter(Box::new(WebSurface::new(surface, canvas)), on_exit);
    if result.is_err() {
        show_arena(false);
    }
    result
}

/// Browser entry: build the host and take over the page
pub async fn run() -> Result<(), ArenaError> {
    let window = web_sys::window().ok_or_else(|| ArenaError::Platform("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ArenaError::Platform("no document".into()))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| ArenaError::Platform(format!("#{} missing", CANVAS_ID)))?
        .dyn_into()
        .map_err(|_| ArenaError::Platform(format!("#{} is not a canvas", CANVAS_ID)))?;

    let store = LocalStore::new().shared();
    let settings = ArenaSettings::load(&store);
    let scores = ScoreStore::new(store.clone());
    log::info!("All-time high: {:.1}", scores.get());

    let audio = AudioEngine::new(
        Box::new(|| WebAudioSink::new().map(|sink| Box::new(sink) as Box<dyn AudioSink>)),
        settings.effective_volume(),
    );
    let seed = js_sys::Date::now() as u64;
    let platform_canvas = canvas.clone();
    let host = Rc::new_cyclic(|weak: &Weak<RefCell<SimulationHost>>| {
        RefCell::new(SimulationHost::new(
            Box::new(WebPlatform::new(weak.clone(), platform_canvas, store)),
            audio,
            scores,
            settings,
            seed,
        ))
    });
    ARENA.with(|slot| *slot.borrow_mut() = Some(host.clone()));

    // Re-entry after the user closed the arena
    if let Some(btn) = document.get_element_by_id(ENTER_ID) {
        let weak = Rc::downgrade(&host);
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let Some(host) = weak.upgrade() else { return };
            if host.borrow().is_running() {
                return;
            }
            let canvas = canvas.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = enter(host, canvas).await {
                    log::error!("Arena failed to start: {}", e);
                }
            });
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    enter(host, canvas).await
}

/// Tear the arena down from page script
#[wasm_bindgen]
pub fn exit_arena() {
    ARENA.with(|slot| {
        if let Some(host) = slot.borrow().as_ref() {
            if let Ok(mut host) = host.try_borrow_mut() {
                host.exit();
            }
        }
    });
}
