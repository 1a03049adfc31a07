pub mod config;
pub mod entity;
pub mod game;
pub mod renderer;
pub mod ticker;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli_renderer;

#[cfg(target_arch = "wasm32")]
pub mod web_main;
#[cfg(target_arch = "wasm32")]
pub mod web_renderer;

pub use config::{GridConfig, FPS, UNIT_SIZE};
pub use entity::{Direction, Position, Snake};
pub use game::{Collision, Game, GameState, Snapshot};
pub use renderer::{dispatch, swipe_input, Flow, Input, Renderer};
pub use ticker::Ticker;

#[cfg(not(target_arch = "wasm32"))]
pub use cli_renderer::{map_key, CliRenderer};

#[cfg(target_arch = "wasm32")]
pub use web_renderer::WebRenderer;
