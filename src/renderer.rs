use crate::entity::Direction;
use crate::game::{Game, GameState, Snapshot};
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Direction(Direction),
    Pause,
    Start,
    Quit,
    Tap, // Touch tap - starts or pauses depending on game state
}

/// Whether the shell's loop should keep going after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Trait that abstracts rendering implementation.
/// This allows for different rendering backends (CLI, Web, etc.)
pub trait Renderer {
    /// Initialize the renderer
    fn init(&mut self) -> io::Result<()>;

    /// Draw the current game snapshot
    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()>;

    /// Clean up and restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Poll for input, waiting at most `timeout`
    fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<Input>>;
}

/// Classify a finished touch by how far it travelled: a swipe along its
/// dominant axis turns the snake, anything shorter than `threshold` is a tap.
pub fn swipe_input(dx: f64, dy: f64, threshold: f64) -> Input {
    let (abs_dx, abs_dy) = (dx.abs(), dy.abs());
    if abs_dx <= threshold && abs_dy <= threshold {
        return Input::Tap;
    }
    if abs_dx > abs_dy {
        if dx > 0.0 {
            Input::Direction(Direction::Right)
        } else {
            Input::Direction(Direction::Left)
        }
    } else if dy > 0.0 {
        Input::Direction(Direction::Down)
    } else {
        Input::Direction(Direction::Up)
    }
}

/// Apply one user input to the game.
pub fn dispatch(game: &mut Game, input: Input) -> Flow {
    match input {
        Input::Direction(direction) => game.set_direction(direction),
        Input::Pause => game.toggle_pause(),
        Input::Start => game.start(),
        Input::Quit => return Flow::Quit,
        Input::Tap => match game.state() {
            GameState::NotStarted | GameState::GameOver => game.start(),
            GameState::Running | GameState::Paused => game.toggle_pause(),
        },
    }
    Flow::Continue
}
