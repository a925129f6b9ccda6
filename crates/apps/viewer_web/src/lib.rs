//! Browser entry point for the flight globe.
//!
//! JavaScript calls [`init`] with a container id and the flight table URL;
//! everything else (capability check, loading, input, the animation loop)
//! runs from here.

use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlCanvasElement, MouseEvent,
    PointerEvent, WheelEvent, Window,
};

use formats::parse_flights;
use gpu::Viewport;
use scene::config::SceneConfig;

pub mod capability;
pub mod error;
pub mod textures;
pub mod viewer;
mod wgpu;

use capability::{Support, backend_attempts, detect, show_unsupported};
use error::{ViewerError, log};
use textures::{TextureData, TextureSlot};
use viewer::Viewer;
use wgpu::{WgpuContext, init_wgpu, max_texture_dimension, render_frame, resize_wgpu, set_texture};

struct App {
    viewer: Viewer,
    gpu: WgpuContext,
    canvas: HtmlCanvasElement,
}

thread_local! {
    static STATE: RefCell<Option<App>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Build the globe inside the element `container_id`.
///
/// `flights_url` serves either a JSON array of `[lat, lng, lat, lng]` rows or
/// the legacy `var flights = [...]` script. `config_url` optionally serves a
/// partial scene configuration.
#[wasm_bindgen]
pub fn init(container_id: String, flights_url: String, config_url: Option<String>) {
    spawn_local(async move {
        if let Err(err) = init_inner(&container_id, &flights_url, config_url.as_deref()).await {
            log(&format!("flight globe init error: {err}"));
        }
    });
}

fn window_and_document() -> Result<(Window, Document), ViewerError> {
    let window = web_sys::window().ok_or(ViewerError::NoWindow)?;
    let document = window.document().ok_or(ViewerError::NoWindow)?;
    Ok((window, document))
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

fn window_size(window: &Window) -> (u32, u32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    (
        dim(window.inner_width()) as u32,
        dim(window.inner_height()) as u32,
    )
}

async fn fetch_text(url: &str) -> Result<String, ViewerError> {
    let fetch_err = |message: String| ViewerError::Fetch {
        url: url.to_string(),
        message,
    };
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    if !resp.ok() {
        return Err(fetch_err(format!("HTTP {}", resp.status())));
    }
    resp.text().await.map_err(|e| fetch_err(e.to_string()))
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ViewerError> {
    let fetch_err = |message: String| ViewerError::Fetch {
        url: url.to_string(),
        message,
    };
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    if !resp.ok() {
        return Err(fetch_err(format!("HTTP {}", resp.status())));
    }
    resp.binary().await.map_err(|e| fetch_err(e.to_string()))
}

async fn init_inner(
    container_id: &str,
    flights_url: &str,
    config_url: Option<&str>,
) -> Result<(), ViewerError> {
    let (window, document) = window_and_document()?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| ViewerError::MissingElement(container_id.to_string()))?;

    let support = detect(&window, &document);
    if !support.is_supported() {
        show_unsupported(&container, support);
        return Ok(());
    }

    let config = match config_url {
        Some(url) => SceneConfig::from_json(&fetch_text(url).await?)?,
        None => SceneConfig::default(),
    };
    let records = parse_flights(&fetch_text(flights_url).await?)?;

    let (width, height) = window_size(&window);
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let viewer = Viewer::new(
        config,
        &records,
        Viewport::new(width, height),
        now_ms(&window),
        seed,
    )?;
    log(&format!(
        "flight globe: {} flights ({} in view)",
        records.len(),
        viewer.scene.paths.len()
    ));

    let buffers = viewer.static_buffers();
    let mut attached = None;
    for &backend in backend_attempts(support) {
        let canvas = create_canvas(&document, width, height)?;
        match init_wgpu(canvas.clone(), &buffers, backend).await {
            Ok(gpu) => {
                attached = Some((canvas, gpu));
                break;
            }
            Err(err) => log(&format!("{backend:?} unavailable: {err}")),
        }
    }
    let Some((canvas, gpu)) = attached else {
        show_unsupported(&container, Support::NoContext);
        return Err(ViewerError::Graphics("no usable graphics backend".to_string()));
    };
    container
        .append_child(&canvas)
        .map_err(ViewerError::dom)?;
    let textures = viewer.scene.config.textures.clone();

    STATE.with(|state| {
        *state.borrow_mut() = Some(App {
            viewer,
            gpu,
            canvas: canvas.clone(),
        });
    });

    register_listeners(&window, &canvas)?;
    for slot in TextureSlot::ALL {
        let url = slot.url(&textures).to_string();
        spawn_local(async move {
            if let Err(err) = load_texture(slot, &url).await {
                log(&format!("texture load error: {err}"));
            }
        });
    }
    start_animation_loop(window)
}

fn create_canvas(
    document: &Document,
    width: u32,
    height: u32,
) -> Result<HtmlCanvasElement, ViewerError> {
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(ViewerError::dom)?
        .dyn_into()
        .map_err(|_| ViewerError::Dom("created element is not a canvas".to_string()))?;
    canvas.set_width(width.max(1));
    canvas.set_height(height.max(1));
    Ok(canvas)
}

async fn load_texture(slot: TextureSlot, url: &str) -> Result<(), ViewerError> {
    let bytes = fetch_bytes(url).await?;
    let max_dimension = STATE.with(|state| {
        state
            .borrow()
            .as_ref()
            .map(|app| max_texture_dimension(&app.gpu))
            .unwrap_or(2048)
    });
    let data = TextureData::from_bytes(&bytes, url, max_dimension)?;
    STATE.with(|state| match state.borrow_mut().as_mut() {
        Some(app) => set_texture(&mut app.gpu, slot, &data),
        None => Ok(()),
    })
}

fn with_app(f: impl FnOnce(&mut App)) {
    STATE.with(|state| {
        if let Some(app) = state.borrow_mut().as_mut() {
            f(app);
        }
    });
}

/// Attach `handler` for events named `name`, downcast to `E`.
fn listen<E: JsCast + 'static>(
    target: &EventTarget,
    name: &str,
    passive: bool,
    mut handler: impl FnMut(E) + 'static,
) -> Result<(), ViewerError> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(ViewerError::dom)?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn register_listeners(window: &Window, canvas: &HtmlCanvasElement) -> Result<(), ViewerError> {
    let target: &EventTarget = canvas.as_ref();
    let element: Element = canvas.clone().into();

    listen(target, "pointerdown", true, move |e: PointerEvent| {
        if let Err(err) = element.set_pointer_capture(e.pointer_id()) {
            log(&format!("pointer capture failed: {}", ViewerError::dom(err)));
        }
        with_app(|app| {
            app.viewer
                .pointer_down(e.offset_x() as f64, e.offset_y() as f64, e.button())
        });
    })?;
    listen(target, "pointermove", true, |e: PointerEvent| {
        with_app(|app| {
            app.viewer
                .pointer_move(e.offset_x() as f64, e.offset_y() as f64)
        });
    })?;
    // An interrupted gesture ends the drag the same way a release does.
    for name in ["pointerup", "pointercancel"] {
        listen(target, name, true, |_: PointerEvent| {
            with_app(|app| app.viewer.pointer_up());
        })?;
    }
    listen(target, "wheel", false, |e: WheelEvent| {
        e.prevent_default();
        with_app(|app| app.viewer.wheel(e.delta_y()));
    })?;
    listen(target, "mousedown", true, |e: MouseEvent| {
        if e.button() != 0 {
            return;
        }
        with_app(|app| {
            if let Some(hit) = app.viewer.pick(e.offset_x() as f64, e.offset_y() as f64) {
                log(&format!("lat {:.2}, lng {:.2}", hit.lat_deg, hit.lng_deg));
            }
        });
    })?;
    listen(target, "contextmenu", false, |e: Event| e.prevent_default())?;

    let resize_window = window.clone();
    listen(window.as_ref(), "resize", true, move |_: Event| {
        let (width, height) = window_size(&resize_window);
        with_app(|app| {
            app.canvas.set_width(width.max(1));
            app.canvas.set_height(height.max(1));
            app.viewer.resize(width, height);
            resize_wgpu(&mut app.gpu, width, height);
        });
    })?;
    Ok(())
}

fn draw(now_ms: f64) {
    with_app(|app| {
        let packet = app.viewer.frame(now_ms);
        if let Err(err) = render_frame(&mut app.gpu, &packet) {
            log(&format!("render error: {err}"));
        }
        if let Some(report) = app.viewer.take_stats_report() {
            log(&format!("frame stats: {report}"));
        }
    });
}

fn request_animation_frame(
    window: &Window,
    f: &Closure<dyn FnMut(f64)>,
) -> Result<(), ViewerError> {
    window
        .request_animation_frame(f.as_ref().unchecked_ref())
        .map(|_| ())
        .map_err(ViewerError::dom)
}

fn start_animation_loop(window: Window) -> Result<(), ViewerError> {
    // The closure reschedules itself, so it holds a handle to its own slot.
    let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = slot.clone();
    let loop_window = window.clone();
    *slot.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        draw(timestamp);
        if let Some(f) = next.borrow().as_ref() {
            if let Err(err) = request_animation_frame(&loop_window, f) {
                log(&format!("animation loop stopped: {err}"));
            }
        }
    }));
    let first = slot.borrow();
    match first.as_ref() {
        Some(f) => request_animation_frame(&window, f),
        None => Ok(()),
    }
}
