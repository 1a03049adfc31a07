use crate::{dispatch, Flow, Game, GridConfig, Renderer, Ticker, WebRenderer, FPS, UNIT_SIZE};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

struct GameLoop {
    game: Game,
    renderer: WebRenderer,
    ticker: Ticker,
    started_at: f64,
}

impl GameLoop {
    fn new() -> Result<Self, JsValue> {
        let mut renderer = WebRenderer::new("gameCanvas")?;
        renderer.init().map_err(|e| JsValue::from_str(&e.to_string()))?;

        let (width_px, height_px) = renderer.viewport();
        let game = Game::new(GridConfig::from_pixels(width_px, height_px, UNIT_SIZE));

        let window = web_sys::window().ok_or("no window")?;
        let performance = window.performance().ok_or("no performance")?;

        Ok(Self {
            game,
            renderer,
            ticker: Ticker::new(FPS),
            started_at: performance.now(),
        })
    }

    /// Returns `Flow::Quit` once the player asks to leave.
    fn update_frame(&mut self, current_time: f64) -> Result<Flow, JsValue> {
        while let Some(input) = self
            .renderer
            .poll_input(Duration::ZERO)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
        {
            if dispatch(&mut self.game, input) == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        let elapsed = Duration::from_secs_f64((current_time - self.started_at).max(0.0) / 1000.0);
        for _ in 0..self.ticker.due(elapsed) {
            self.game.tick();
        }

        // Renderer manages its own frame rate
        self.renderer
            .render(&self.game.snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Flow::Continue)
    }
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or("no window")?
        .request_animation_frame(f.as_ref().unchecked_ref())
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&"[WASM] Starting snake...".into());

    let game_loop = match GameLoop::new() {
        Ok(gl) => {
            let grid = gl.game.grid();
            web_sys::console::log_1(
                &format!("[WASM] Grid is {}x{} cells", grid.width(), grid.height()).into(),
            );
            Rc::new(RefCell::new(gl))
        }
        Err(e) => {
            web_sys::console::error_1(&format!("[WASM] Failed to create game loop: {:?}", e).into());
            return Err(e);
        }
    };

    let window = web_sys::window().ok_or("no window")?;
    let performance = window.performance().ok_or("no performance")?;

    // The closure reschedules itself through `f`
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let current_time = performance.now();

        match game_loop.borrow_mut().update_frame(current_time) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => {
                web_sys::console::log_1(&"[WASM] Game quit".into());
                return; // Stop loop
            }
            Err(e) => {
                web_sys::console::error_1(&e);
                return; // Stop loop on error
            }
        }

        if let Some(next) = f.borrow().as_ref() {
            if let Err(e) = request_animation_frame(next) {
                web_sys::console::error_1(&e);
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(first) = g.borrow().as_ref() {
        request_animation_frame(first)?;
    }

    web_sys::console::log_1(&"[WASM] Game loop started".into());

    Ok(())
}
