use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen::{
    JsCast,
    JsValue,
};
use wasm_bindgen::closure::Closure;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlImageElement,
    Response,
};

// ==================== Logging ====================
// Everything goes to the browser devtools console
// - log!   -> console.log
// - error! -> console.error
macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    }
}

macro_rules! error {
    ($($t:tt)*) => {
        web_sys::console::error_1(&format!($($t)*).into())
    }
}

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "gameWindow";
    pub const CONTEXT_2D: &str = "2d";
    pub const KEY_DOWN: &str = "keydown";
    pub const KEY_UP: &str = "keyup";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn create_html_image_element() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err|
            anyhow!("Could not create image element : {:#?}", err)
        )
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - JsValue error -> anyhow
        // - None -> anyhow
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(html::CANVAS_ID)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{:#?}'", html::CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

/// Resize the backing store of the game canvas
pub fn resize_canvas(width: u32, height: u32) -> Result<()> {
    let canvas = canvas()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(())
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    if !resp.ok() {
        return Err(anyhow!(
            "request for [{}] failed with status {}",
            json_path,
            resp.status()
        ));
    }
    let json =
    resp.json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame {:#?}", err))
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    Closure::wrap(Box::new(f) as Box<dyn FnMut(f64)>)
}

/// Milliseconds since page load, same clock requestAnimationFrame reports
pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

/// Register keydown + keyup listeners on the window
/// - listeners live for the whole page, so the closures are leaked
pub fn add_key_listeners(
    on_down: impl FnMut(web_sys::KeyboardEvent) + 'static,
    on_up: impl FnMut(web_sys::KeyboardEvent) + 'static,
) -> Result<()> {
    let window = window()?;
    let on_down = Closure::wrap(Box::new(on_down) as Box<dyn FnMut(web_sys::KeyboardEvent)>);
    let on_up = Closure::wrap(Box::new(on_up) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

    window
        .add_event_listener_with_callback(html::KEY_DOWN, on_down.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not register keydown listener {:#?}", err))?;
    window
        .add_event_listener_with_callback(html::KEY_UP, on_up.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not register keyup listener {:#?}", err))?;

    on_down.forget();
    on_up.forget();
    Ok(())
}
