use crate::config::UNIT_SIZE;
use crate::entity::Direction;
use crate::game::{GameState, Snapshot};
use crate::renderer::{swipe_input, Input, Renderer};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, TouchEvent};

const CELL_SIZE: f64 = UNIT_SIZE as f64;
const TARGET_FRAME_TIME: f64 = 16.0; // ~60 FPS
const SWIPE_THRESHOLD: f64 = 30.0; // Minimum distance in pixels to register a swipe

const COLOR_BACKGROUND: &str = "#000000";
const COLOR_FOOD: &str = "#FF0000";
const COLOR_HEAD: &str = "#00FF00";
const COLOR_BODY: &str = "rgb(45, 180, 0)";
const COLOR_SCORE: &str = "#FF0000";
const COLOR_UI: &str = "#FFFFFF";

type InputQueue = Rc<RefCell<VecDeque<Input>>>;

fn js_err(e: JsValue) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{:?}", e))
}

fn key_input(key: &str) -> Option<Input> {
    match key {
        "ArrowUp" => Some(Input::Direction(Direction::Up)),
        "ArrowDown" => Some(Input::Direction(Direction::Down)),
        "ArrowLeft" => Some(Input::Direction(Direction::Left)),
        "ArrowRight" => Some(Input::Direction(Direction::Right)),
        "p" | "P" => Some(Input::Pause),
        "Enter" => Some(Input::Start),
        "Escape" | "q" | "Q" => Some(Input::Quit),
        _ => None,
    }
}

pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    window: web_sys::Window,
    device_pixel_ratio: f64,
    last_render_time: f64,

    // Filled by event listeners, drained by the game loop
    pending_input: InputQueue,

    // Touch state
    touch_start_pos: Rc<RefCell<Option<(f64, f64)>>>,
}

impl WebRenderer {
    pub fn new(canvas_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        context.set_image_smoothing_enabled(false);

        let device_pixel_ratio = window.device_pixel_ratio();

        Ok(Self {
            canvas,
            context,
            window,
            device_pixel_ratio,
            last_render_time: 0.0,
            pending_input: Rc::new(RefCell::new(VecDeque::new())),
            touch_start_pos: Rc::new(RefCell::new(None)),
        })
    }

    /// Size of the browser viewport in CSS pixels.
    pub fn viewport(&self) -> (i32, i32) {
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        (width as i32, height as i32)
    }

    fn setup_keyboard_listener(&self) -> Result<(), JsValue> {
        let pending_input = self.pending_input.clone();

        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if let Some(input) = key_input(event.key().as_str()) {
                pending_input.borrow_mut().push_back(input);
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        self.window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;

        closure.forget(); // Keep listener alive
        Ok(())
    }

    fn setup_touch_listeners(&self) -> Result<(), JsValue> {
        let pending_input = self.pending_input.clone();
        let touch_start_pos = self.touch_start_pos.clone();

        // TouchStart: Record initial position
        let touch_start_pos_clone = touch_start_pos.clone();
        let touchstart_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();

            if let Some(touch) = event.touches().item(0) {
                let x = touch.client_x() as f64;
                let y = touch.client_y() as f64;
                *touch_start_pos_clone.borrow_mut() = Some((x, y));
            }
        }) as Box<dyn FnMut(TouchEvent)>);

        self.canvas
            .add_event_listener_with_callback("touchstart", touchstart_closure.as_ref().unchecked_ref())?;
        touchstart_closure.forget();

        // TouchMove: Prevent default to avoid scrolling
        let touchmove_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
        }) as Box<dyn FnMut(TouchEvent)>);

        self.canvas
            .add_event_listener_with_callback("touchmove", touchmove_closure.as_ref().unchecked_ref())?;
        touchmove_closure.forget();

        // TouchEnd: swipe turns the snake, a tap starts or pauses
        let touch_start_pos_clone = touch_start_pos.clone();
        let touchend_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();

            let Some(touch) = event.changed_touches().item(0) else {
                return;
            };
            let Some((start_x, start_y)) = touch_start_pos_clone.borrow_mut().take() else {
                return;
            };

            let dx = touch.client_x() as f64 - start_x;
            let dy = touch.client_y() as f64 - start_y;
            let input = swipe_input(dx, dy, SWIPE_THRESHOLD);
            pending_input.borrow_mut().push_back(input);

            // Haptic feedback on turns; fails silently if not supported
            if matches!(input, Input::Direction(_)) {
                if let Some(window) = web_sys::window() {
                    let navigator = window.navigator();
                    let _ = js_sys::Reflect::get(&navigator, &JsValue::from_str("vibrate"))
                        .ok()
                        .and_then(|vibrate_fn| {
                            let vibrate = vibrate_fn.dyn_ref::<js_sys::Function>()?;
                            vibrate.call1(&navigator, &JsValue::from_f64(50.0)).ok()
                        });
                }
            }
        }) as Box<dyn FnMut(TouchEvent)>);

        self.canvas
            .add_event_listener_with_callback("touchend", touchend_closure.as_ref().unchecked_ref())?;
        touchend_closure.forget();

        // TouchCancel: Clear state if touch is cancelled
        let touchcancel_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
            *touch_start_pos.borrow_mut() = None;
        }) as Box<dyn FnMut(TouchEvent)>);

        self.canvas
            .add_event_listener_with_callback("touchcancel", touchcancel_closure.as_ref().unchecked_ref())?;
        touchcancel_closure.forget();

        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or(self.last_render_time + TARGET_FRAME_TIME)
    }

    /// Match the canvas to the grid, scaled for high DPI displays.
    fn resize(&self, display_width: f64, display_height: f64) -> Result<(), JsValue> {
        let pixel_width = (display_width * self.device_pixel_ratio) as u32;
        let pixel_height = (display_height * self.device_pixel_ratio) as u32;

        if self.canvas.width() == pixel_width && self.canvas.height() == pixel_height {
            return Ok(());
        }

        self.canvas.set_width(pixel_width);
        self.canvas.set_height(pixel_height);

        let element: &HtmlElement = self.canvas.unchecked_ref();
        element
            .style()
            .set_property("width", &format!("{}px", display_width))?;
        element
            .style()
            .set_property("height", &format!("{}px", display_height))?;

        // Setting width/height resets the context
        self.context.set_image_smoothing_enabled(false);
        self.context
            .scale(self.device_pixel_ratio, self.device_pixel_ratio)?;
        Ok(())
    }

    fn draw_cell(&self, x: i32, y: i32, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            x as f64 * CELL_SIZE,
            y as f64 * CELL_SIZE,
            CELL_SIZE,
            CELL_SIZE,
        );
    }

    fn draw_food(&self, snapshot: &Snapshot<'_>) -> Result<(), JsValue> {
        let radius = CELL_SIZE / 2.0;
        self.context.set_fill_style_str(COLOR_FOOD);
        self.context.begin_path();
        self.context.arc(
            snapshot.food.x as f64 * CELL_SIZE + radius,
            snapshot.food.y as f64 * CELL_SIZE + radius,
            radius,
            0.0,
            2.0 * PI,
        )?;
        self.context.fill();
        Ok(())
    }

    fn draw_snake(&self, snapshot: &Snapshot<'_>) {
        for (i, segment) in snapshot.body.iter().enumerate().rev() {
            if !snapshot.grid.contains(*segment) {
                continue;
            }
            let color = if i == 0 { COLOR_HEAD } else { COLOR_BODY };
            self.draw_cell(segment.x, segment.y, color);
        }
    }

    fn draw_text(&self, text: &str, font: &str, color: &str, y: f64, width: f64) -> Result<(), JsValue> {
        self.context.set_fill_style_str(color);
        self.context.set_font(font);
        self.context.set_text_align("center");
        self.context.set_text_baseline("top");
        self.context.fill_text(text, width / 2.0, y)
    }

    fn draw_ui(&self, snapshot: &Snapshot<'_>, width: f64, height: f64) -> Result<(), JsValue> {
        let score = format!("Score: {}", snapshot.score);
        self.draw_text(&score, "bold 25px monospace", COLOR_SCORE, 4.0, width)?;

        let (title, hint) = match snapshot.state {
            GameState::NotStarted => ("Snake", "Press ENTER or tap to Start"),
            GameState::Paused => ("Paused", "Press P or tap to Resume"),
            GameState::GameOver => ("Game Over", "Press ENTER or tap to Restart"),
            GameState::Running => return Ok(()),
        };

        let middle = height / 2.0;
        self.draw_text(title, "bold 40px monospace", COLOR_SCORE, middle - 40.0, width)?;
        self.draw_text(hint, "bold 20px monospace", COLOR_UI, middle + 10.0, width)
    }

    fn draw(&mut self, snapshot: &Snapshot<'_>) -> Result<(), JsValue> {
        let width = snapshot.grid.width() as f64 * CELL_SIZE;
        let height = snapshot.grid.height() as f64 * CELL_SIZE;
        self.resize(width, height)?;

        self.context.set_fill_style_str(COLOR_BACKGROUND);
        self.context.fill_rect(0.0, 0.0, width, height);

        if snapshot.state != GameState::NotStarted {
            self.draw_food(snapshot)?;
            self.draw_snake(snapshot);
        }
        self.draw_ui(snapshot, width, height)
    }
}

impl Renderer for WebRenderer {
    fn init(&mut self) -> io::Result<()> {
        self.setup_keyboard_listener().map_err(js_err)?;
        self.setup_touch_listeners().map_err(js_err)?;
        self.last_render_time = self.current_time();
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let now = self.current_time();

        // Frame rate limiting
        if now - self.last_render_time < TARGET_FRAME_TIME {
            return Ok(());
        }
        self.last_render_time = now;

        self.draw(snapshot).map_err(js_err)
    }

    fn cleanup(&mut self) -> io::Result<()> {
        // No cleanup needed for web
        Ok(())
    }

    fn poll_input(&mut self, _timeout: Duration) -> io::Result<Option<Input>> {
        Ok(self.pending_input.borrow_mut().pop_front())
    }
}
