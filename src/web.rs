#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use js_sys::Uint8Array;
use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, Response};

use crate::app::SceneHandle;
use crate::config::SceneConfig;
use crate::environment::{EnvironmentError, EnvironmentSlot, FaceFetcher, FaceRef};
use crate::render::Renderer;

/// Fetches faces over HTTP. Paths are requested relative to the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebFetcher;

impl FaceFetcher for WebFetcher {
    async fn fetch(&self, reference: &FaceRef) -> Result<Vec<u8>, EnvironmentError> {
        let url = match reference {
            FaceRef::Url(url) => url.clone(),
            FaceRef::Path(path) => path.to_string_lossy().replace('\\', "/"),
        };
        fetch_bytes(&url)
            .await
            .map_err(|err| EnvironmentError::Unresolvable {
                reference: reference.to_string(),
                reason: err.to_string(),
            })
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| anyhow!("request failed: {err:?}"))?
        .dyn_into::<Response>()
        .map_err(|_| anyhow!("fetch did not return a Response"))?;
    if !response.ok() {
        return Err(anyhow!("HTTP {}", response.status()));
    }
    let buffer = response
        .array_buffer()
        .map_err(|err| anyhow!("response body unavailable: {err:?}"))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|err| anyhow!("reading response body failed: {err:?}"))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Mounts the scene preset `preset` on the canvas with id `canvas_id` and
/// starts animating it.
#[wasm_bindgen]
pub async fn start(canvas_id: String, preset: String) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    mount(&canvas_id, &preset)
        .await
        .map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

async fn mount(canvas_id: &str, preset: &str) -> Result<()> {
    let config = SceneConfig::preset(preset)?;
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("canvas element '{canvas_id}' not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element '{canvas_id}' is not a canvas"))?;

    let (width, height) = fit_canvas(&window, &canvas);
    let renderer = Renderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), width, height).await?;
    let mut handle = SceneHandle::initialize(&config, width, height, renderer)?;

    if let Some(faces) = config.environment.clone() {
        let slot = EnvironmentSlot::new();
        handle.attach_environment(slot.clone());
        wasm_bindgen_futures::spawn_local(async move {
            slot.fill(faces.load(&WebFetcher).await);
        });
    }
    info!("scene '{}' mounted on #{canvas_id} ({width}x{height})", config.name);

    let state = Rc::new(RefCell::new(WebState {
        handle,
        canvas,
        resize_closure: None,
    }));
    listen_for_resize(&state)?;
    start_animation_loop(state)
}

struct WebState {
    handle: SceneHandle<Renderer>,
    canvas: HtmlCanvasElement,
    resize_closure: Option<Closure<dyn FnMut()>>,
}

impl WebState {
    fn render_frame(&mut self) -> Result<()> {
        match self.handle.tick() {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.handle.target.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(err) => {
                warn!("frame skipped: {err}");
                Ok(())
            }
        }
    }
}

/// Matches the canvas backing store to its CSS size and returns it.
fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let ratio = window.device_pixel_ratio().max(1.0);
    let width = (canvas.client_width().max(1) as f64 * ratio) as u32;
    let height = (canvas.client_height().max(1) as f64 * ratio) as u32;
    canvas.set_width(width);
    canvas.set_height(height);
    (width, height)
}

fn listen_for_resize(state: &Rc<RefCell<WebState>>) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let weak = Rc::downgrade(state);
    let closure = Closure::wrap(Box::new(move || {
        let (Some(state), Some(window)) = (weak.upgrade(), web_sys::window()) else {
            return;
        };
        let mut state = state.borrow_mut();
        let (width, height) = fit_canvas(&window, &state.canvas);
        state.handle.resize(width, height);
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("failed to listen for resize: {err:?}"))?;
    state.borrow_mut().resize_closure = Some(closure);
    Ok(())
}

/// Ticks once per `requestAnimationFrame` until a frame fails fatally.
fn start_animation_loop(state: Rc<RefCell<WebState>>) -> Result<()> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Err(err) = state.borrow_mut().render_frame() {
            error!("{err:#}");
            return;
        }
        if let Some(closure) = next.borrow().as_ref() {
            if let Err(err) = request_frame(closure) {
                error!("{err:#}");
            }
        }
    }) as Box<dyn FnMut()>));

    let first = callback.borrow();
    let closure = first
        .as_ref()
        .ok_or_else(|| anyhow!("animation callback missing"))?;
    request_frame(closure)
}

fn request_frame(closure: &Closure<dyn FnMut()>) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map(|_| ())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))
}
