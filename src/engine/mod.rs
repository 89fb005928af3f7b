use crate::browser;
use anyhow::{anyhow, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - because we control the closure creation and specify the expected type,
    // in principle this should be generally safe (unsafe) code
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

pub mod input;
pub mod throttle;

use self::input::InputState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `now` is the simulated clock in milliseconds, advanced one fixed
    /// step per call
    fn update(&mut self, input: &InputState, now: f64);
    fn draw(&self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f64 = 1.0 / 60.0 * 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f64,
    simulated_time: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

/// TABLE
/// ┌──────────────────── One requestAnimationFrame ─────────────────────┐
/// │  drain key events  ──►  InputState (one snapshot per frame)        │
/// │  accumulate delta  ──►  update() x N fixed 16.6ms steps            │
/// │  draw()            ──►  background, debug boundaries, player       │
/// │  request next frame                                                │
/// └────────────────────────────────────────────────────────────────────┘
impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
            simulated_time: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut input_state = InputState::default();
        let mut input_open = true;

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            if input_open && !input::process_input(&mut input_state, &mut keyevent_receiver) {
                log!("Input: key event channel closed");
                input_open = false;
            }

            game_loop.accumulated_delta += perf - game_loop.last_frame;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game_loop.simulated_time += FRAME_SIZE;
                game.update(&input_state, game_loop.simulated_time);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);

            if let Some(next_frame) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next_frame) {
                    error!("GameLoop: could not schedule next frame : {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
// Screen space : top left is origin, +y points DOWN
#[derive(Debug, Default, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn translate(self, delta: Point) -> Self {
        Point {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn new_from_x_y(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.x() + self.width()
    }

    pub fn bottom(&self) -> f32 {
        self.y() + self.height()
    }

    pub fn translated(&self, delta: Point) -> Self {
        Rect::new(self.position.translate(delta), self.size)
    }

    /// Axis aligned overlap test with INCLUSIVE edges
    /// - rects that only touch along an edge count as overlapping
    /// ┌──────┐
    /// │ self │
    /// │   ┌──┼────┐
    /// └───┼──┘    │
    ///     │ rect  │
    ///     └───────┘
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.x() <= rect.right()
            && self.right() >= rect.x()
            && self.y() <= rect.bottom()
            && self.bottom() >= rect.y()
    }
}

// ==================== Rendering ====================
/// Anything that can be blitted from : only its pixel size matters to the
/// game, the handle itself stays opaque
pub trait ImageSource {
    fn size(&self) -> Size;
}

impl ImageSource for HtmlImageElement {
    fn size(&self) -> Size {
        Size {
            width: self.width() as f32,
            height: self.height() as f32,
        }
    }
}

/// Where sprites end up. The canvas `Renderer` is the real one, tests swap in
/// a recorder
pub trait DrawSink<I: ImageSource> {
    /// copy `frame` (source pixels) of `image` into `destination`
    fn draw_image(&self, image: &I, frame: &Rect, destination: &Rect);

    /// debug overlay, sinks that can't draw outlines ignore it
    fn draw_outline(&self, _rect: &Rect) {}
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    const OUTLINE_COLOR: &'static str = "red";

    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }
}

impl DrawSink<HtmlImageElement> for Renderer {
    fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        // a bad blit costs one sprite for one frame, never the whole loop
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x().into(),
                frame.y().into(),
                frame.width().into(),
                frame.height().into(),
                destination.x().into(),
                destination.y().into(),
                destination.width().into(),
                destination.height().into(),
            )
        {
            error!("Renderer: draw_image failed : {:#?}", err);
        }
    }

    fn draw_outline(&self, rect: &Rect) {
        self.context.set_stroke_style_str(Self::OUTLINE_COLOR);
        self.context.begin_path();
        self.context.rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
        self.context.stroke();
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback: Closure<dyn FnMut()> = Closure::once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback: Closure<dyn FnMut(JsValue)> = Closure::once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - double unwrap because Result<Result<(), Error>, oneshot::Canceled>
    // - first unwrap yields channel result : Result<(), Error>
    // - second unwrap yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}
