use crate::config::{
    pixel_to_cell, GridConfig, APPLES_PER_SPEEDUP, INITIAL_BODY_PARTS, MIN_UPDATE_RATE,
    START_PIXEL, UNIT_SIZE, UPDATE_RATE,
};
use crate::entity::{Direction, Position, Snake};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// What ended the last game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

/// Read-only view of a game handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<'a> {
    /// Head first. Segments may lie outside the grid right after a start.
    pub body: &'a [Position],
    pub food: Position,
    pub score: u32,
    pub state: GameState,
    pub grid: GridConfig,
}

impl Snapshot<'_> {
    pub fn head(&self) -> Option<Position> {
        self.body.first().copied()
    }
}

/// The whole simulation. Owned by the shell and driven by its timer.
pub struct Game {
    grid: GridConfig,
    snake: Snake,
    /// Direction of the last step taken.
    heading: Direction,
    /// Direction the next step will take.
    pending: Direction,
    food: Position,
    apples_eaten: u32,
    /// Sub-ticks per grid step.
    update_rate: u32,
    update_counter: u32,
    state: GameState,
    collision: Option<Collision>,
    rng: StdRng,
}

impl Game {
    pub fn new(grid: GridConfig) -> Self {
        Self::with_rng(grid, StdRng::from_entropy())
    }

    /// A game whose food placement is fully determined by `seed`.
    pub fn with_seed(grid: GridConfig, seed: u64) -> Self {
        Self::with_rng(grid, StdRng::seed_from_u64(seed))
    }

    fn with_rng(grid: GridConfig, rng: StdRng) -> Self {
        let mut game = Self {
            grid,
            snake: Self::starting_snake(),
            heading: Direction::Right,
            pending: Direction::Right,
            food: Position::new(0, 0),
            apples_eaten: 0,
            update_rate: UPDATE_RATE,
            update_counter: UPDATE_RATE,
            state: GameState::NotStarted,
            collision: None,
            rng,
        };
        game.place_food();
        game
    }

    fn starting_snake() -> Snake {
        let (px, py) = START_PIXEL;
        let head = pixel_to_cell(px, py, UNIT_SIZE);
        Snake::new(head, Direction::Right, INITIAL_BODY_PARTS)
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.apples_eaten
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Position {
        self.food
    }

    /// Direction the snake will move on its next step.
    pub fn direction(&self) -> Direction {
        self.pending
    }

    pub fn update_rate(&self) -> u32 {
        self.update_rate
    }

    pub fn collision(&self) -> Option<Collision> {
        self.collision
    }

    /// Begin a fresh round. Only has an effect before the first game or
    /// after a game over.
    pub fn start(&mut self) {
        if !matches!(self.state, GameState::NotStarted | GameState::GameOver) {
            return;
        }

        self.snake = Self::starting_snake();
        self.heading = Direction::Right;
        self.pending = Direction::Right;
        self.apples_eaten = 0;
        self.update_rate = UPDATE_RATE;
        self.update_counter = UPDATE_RATE;
        self.collision = None;
        self.place_food();
        self.state = GameState::Running;

        info!(
            "game started on {}x{} grid, food at ({}, {})",
            self.grid.width(), self.grid.height(), self.food.x, self.food.y
        );
    }

    pub fn set_direction(&mut self, direction: Direction) {
        if self.state != GameState::Running {
            return;
        }
        // Neither the last step taken nor the turn still waiting for a step
        // may be reversed.
        if self.heading.is_opposite(direction) || self.pending.is_opposite(direction) {
            return;
        }
        self.pending = direction;
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Running => {
                info!("paused at score {}", self.apples_eaten);
                GameState::Paused
            }
            GameState::Paused => {
                info!("resumed");
                GameState::Running
            }
            other => other,
        };
    }

    /// One sub-tick. Shells call this at a fixed rate; the snake moves once
    /// every `update_rate` calls.
    pub fn tick(&mut self) {
        if self.state != GameState::Running {
            return;
        }

        self.update_counter = self.update_counter.saturating_sub(1);
        if self.update_counter == 0 {
            self.advance();
            self.update_counter = self.update_rate;
        }
    }

    fn advance(&mut self) {
        if self.state != GameState::Running {
            return;
        }

        self.heading = self.pending;
        let vacated = self.snake.slither(self.heading);
        let head = self.snake.head();
        trace!("head -> ({}, {})", head.x, head.y);

        if head == self.food {
            self.snake.grow_into(vacated);
            self.apples_eaten += 1;
            self.place_food();

            if self.apples_eaten % APPLES_PER_SPEEDUP == 0 && self.update_rate > MIN_UPDATE_RATE {
                self.update_rate -= 1;
                debug!(
                    "speed up after {} apples: {} sub-ticks per step",
                    self.apples_eaten, self.update_rate
                );
            }
        }

        let collision = if self.snake.bites_itself() {
            Some(Collision::Body)
        } else if !self.grid.contains(head) {
            Some(Collision::Wall)
        } else {
            None
        };

        if let Some(collision) = collision {
            self.collision = Some(collision);
            self.state = GameState::GameOver;
            info!(
                "game over ({:?}) at ({}, {}) with score {}",
                collision, head.x, head.y, self.apples_eaten
            );
        }
    }

    /// Food may land under the snake; nothing excludes occupied cells.
    fn place_food(&mut self) {
        let x = self.rng.gen_range(0..self.grid.width());
        let y = self.rng.gen_range(0..self.grid.height());
        self.food = Position::new(x, y);
        debug!("food placed at ({}, {})", x, y);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            body: self.snake.segments(),
            food: self.food,
            score: self.apples_eaten,
            state: self.state,
            grid: self.grid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    fn running_game(width: i32, height: i32) -> Game {
        let mut game = Game::with_seed(GridConfig::new(width, height), 42);
        game.start();
        // Keep food out of the way unless a test puts it somewhere.
        game.food = Position::new(width - 1, height - 1);
        game
    }

    /// Put food in the cell the head is about to enter, then step.
    fn eat_one(game: &mut Game) {
        game.food = game.snake.head().moved(game.pending);
        game.advance();
    }

    proptest! {
        #[test]
        fn prop_head_moves_one_unit_per_step(
            moves in prop::collection::vec(direction_strategy(), 1..60)
        ) {
            let mut game = running_game(200, 200);
            game.snake = Snake::new(Position::new(100, 100), Direction::Right, 6);

            for direction in moves {
                if game.heading.is_opposite(direction) {
                    continue;
                }
                game.set_direction(direction);
                let before = game.snake.head();
                game.advance();

                prop_assert_eq!(game.snake.head(), before.moved(direction));
                if game.state != GameState::Running {
                    break;
                }
            }
        }

        #[test]
        fn prop_reverse_never_accepted(
            moves in prop::collection::vec(direction_strategy(), 1..60)
        ) {
            let mut game = running_game(200, 200);
            game.snake = Snake::new(Position::new(100, 100), Direction::Right, 6);

            for direction in moves {
                let heading = game.heading;
                let current = game.direction();
                game.set_direction(direction);

                if current.is_opposite(direction) || heading.is_opposite(direction) {
                    prop_assert_eq!(game.direction(), current);
                } else {
                    prop_assert_eq!(game.direction(), direction);
                }
                prop_assert!(!game.direction().is_opposite(current));

                game.advance();
                if game.state != GameState::Running {
                    break;
                }
            }
        }

        #[test]
        fn prop_speed_up_every_five_apples_floored(apples in 0u32..120) {
            let mut game = running_game(400, 10);
            game.snake = Snake::new(Position::new(5, 5), Direction::Right, 6);

            for _ in 0..apples {
                eat_one(&mut game);
            }

            prop_assert_eq!(game.state, GameState::Running);
            prop_assert_eq!(game.score(), apples);
            prop_assert_eq!(game.snake.len(), 6 + apples as usize);
            let expected = UPDATE_RATE.saturating_sub(apples / APPLES_PER_SPEEDUP).max(MIN_UPDATE_RATE);
            prop_assert_eq!(game.update_rate(), expected);
        }

        #[test]
        fn prop_new_food_within_grid(seed in any::<u64>(), width in 1i32..50, height in 1i32..50) {
            let mut game = Game::with_seed(GridConfig::new(width, height), seed);
            for _ in 0..20 {
                game.place_food();
                prop_assert!(game.grid.contains(game.food));
            }
        }

        #[test]
        fn prop_toggle_pause_twice_is_identity(
            moves in prop::collection::vec(direction_strategy(), 0..10)
        ) {
            let mut game = running_game(200, 200);
            for direction in moves {
                game.set_direction(direction);
                game.advance();
            }
            let state = game.state;
            let snake = game.snake.clone();
            let food = game.food;
            let score = game.score();

            game.toggle_pause();
            game.toggle_pause();

            prop_assert_eq!(game.state, state);
            prop_assert_eq!(&game.snake, &snake);
            prop_assert_eq!(game.food, food);
            prop_assert_eq!(game.score(), score);
        }
    }

    #[test]
    fn test_new_game_waits_for_start() {
        let mut game = Game::with_seed(GridConfig::new(20, 20), 1);
        assert_eq!(game.state(), GameState::NotStarted);

        let head = game.snake.head();
        for _ in 0..100 {
            game.tick();
        }
        assert_eq!(game.snake.head(), head);

        game.set_direction(Direction::Down);
        assert_eq!(game.direction(), Direction::Right);
    }

    #[test]
    fn test_start_layout() {
        let game = running_game(20, 20);
        let snap = game.snapshot();

        assert_eq!(snap.state, GameState::Running);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.body.len(), INITIAL_BODY_PARTS);
        assert_eq!(snap.head(), Some(Position::new(2, 2)));
        assert_eq!(snap.body[1], Position::new(1, 2));
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.update_rate(), UPDATE_RATE);
    }

    #[test]
    fn test_one_step_right_from_start() {
        let mut game = running_game(20, 20);
        let before: Vec<Position> = game.snake.segments().to_vec();

        game.advance();

        let after = game.snake.segments();
        assert_eq!(after[0], Position::new(3, 2));
        assert_eq!(&after[1..], &before[..before.len() - 1]);
        assert_eq!(after.len(), INITIAL_BODY_PARTS);
        assert_eq!(game.score(), 0);
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = running_game(20, 20);
        let old_tail = *game.snake.segments().last().unwrap();

        eat_one(&mut game);

        assert_eq!(game.snake.len(), INITIAL_BODY_PARTS + 1);
        assert_eq!(game.score(), 1);
        assert_eq!(*game.snake.segments().last().unwrap(), old_tail);
        assert!(game.grid.contains(game.food));
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_food_usually_moves_when_eaten() {
        let mut moved = 0;
        for seed in 0..50 {
            let mut game = Game::with_seed(GridConfig::new(30, 30), seed);
            game.start();
            eat_one(&mut game);
            if game.food != game.snake.head() {
                moved += 1;
            }
        }
        assert!(moved >= 45, "food respawned in place {} times", 50 - moved);
    }

    #[test]
    fn test_fifth_apple_speeds_up() {
        let mut game = running_game(100, 20);
        for _ in 0..4 {
            eat_one(&mut game);
        }
        assert_eq!(game.update_rate(), UPDATE_RATE);

        eat_one(&mut game);
        assert_eq!(game.update_rate(), UPDATE_RATE - 1);
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut game = running_game(20, 20);
        game.snake = Snake::new(Position::new(10, 10), Direction::Right, 6);

        game.set_direction(Direction::Down);
        game.advance();
        game.set_direction(Direction::Left);
        game.advance();
        assert_eq!(game.state(), GameState::Running);

        game.set_direction(Direction::Up);
        game.advance();

        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.collision(), Some(Collision::Body));
    }

    #[test]
    fn test_wall_collision_ends_game() {
        let mut game = running_game(20, 20);
        game.set_direction(Direction::Up);

        game.advance(); // (2, 1)
        game.advance(); // (2, 0)
        assert_eq!(game.state(), GameState::Running);

        game.advance(); // (2, -1)
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.collision(), Some(Collision::Wall));
    }

    #[test]
    fn test_left_wall_collision() {
        let mut game = running_game(20, 20);
        game.set_direction(Direction::Down);
        game.advance(); // (2, 3)
        game.set_direction(Direction::Left);
        game.advance(); // (1, 3)
        game.advance(); // (0, 3)
        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.snake.head(), Position::new(0, 3));

        game.advance(); // (-1, 3)
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.collision(), Some(Collision::Wall));
    }

    #[test]
    fn test_right_and_bottom_walls() {
        let mut game = running_game(5, 5);
        game.food = Position::new(0, 4);
        game.advance(); // (3, 2)
        game.advance(); // (4, 2)
        assert_eq!(game.state(), GameState::Running);
        game.advance(); // (5, 2)
        assert_eq!(game.collision(), Some(Collision::Wall));

        let mut game = running_game(5, 5);
        game.food = Position::new(0, 0);
        game.set_direction(Direction::Down);
        game.advance(); // (2, 3)
        game.advance(); // (2, 4)
        assert_eq!(game.state(), GameState::Running);
        game.advance(); // (2, 5)
        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn test_no_steps_after_game_over() {
        let mut game = running_game(20, 20);
        game.set_direction(Direction::Up);
        for _ in 0..3 {
            game.advance();
        }
        assert_eq!(game.state(), GameState::GameOver);

        let body = game.snake.clone();
        game.advance();
        for _ in 0..50 {
            game.tick();
        }
        game.set_direction(Direction::Left);
        game.toggle_pause();

        assert_eq!(game.snake, body);
        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn test_restart_after_game_over_resets() {
        let mut game = running_game(20, 20);
        eat_one(&mut game);
        eat_one(&mut game);
        game.food = Position::new(19, 19);
        game.set_direction(Direction::Up);
        for _ in 0..3 {
            game.advance();
        }
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.score(), 2);

        game.start();

        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake.len(), INITIAL_BODY_PARTS);
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.update_rate(), UPDATE_RATE);
        assert_eq!(game.collision(), None);
    }

    #[test]
    fn test_start_ignored_while_playing() {
        let mut game = running_game(20, 20);
        eat_one(&mut game);

        game.start();
        assert_eq!(game.score(), 1);

        game.toggle_pause();
        game.start();
        assert_eq!(game.state(), GameState::Paused);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_tick_steps_once_per_update_rate() {
        let mut game = running_game(20, 20);
        let head = game.snake.head();

        for _ in 0..UPDATE_RATE - 1 {
            game.tick();
        }
        assert_eq!(game.snake.head(), head);

        game.tick();
        assert_eq!(game.snake.head(), Position::new(3, 2));

        for _ in 0..UPDATE_RATE {
            game.tick();
        }
        assert_eq!(game.snake.head(), Position::new(4, 2));
    }

    #[test]
    fn test_tick_follows_faster_rate() {
        let mut game = running_game(100, 20);
        for _ in 0..5 {
            eat_one(&mut game);
        }
        assert_eq!(game.update_rate(), UPDATE_RATE - 1);
        game.update_counter = game.update_rate;

        let head = game.snake.head();
        for _ in 0..UPDATE_RATE - 1 {
            game.tick();
        }
        assert_eq!(game.snake.head(), head.moved(Direction::Right));
    }

    #[test]
    fn test_paused_game_does_not_move() {
        let mut game = running_game(20, 20);
        game.toggle_pause();
        assert_eq!(game.state(), GameState::Paused);

        let head = game.snake.head();
        for _ in 0..100 {
            game.tick();
        }
        game.set_direction(Direction::Down);

        assert_eq!(game.snake.head(), head);
        assert_eq!(game.direction(), Direction::Right);

        game.toggle_pause();
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        let mut game = running_game(20, 20);
        game.set_direction(Direction::Up);
        game.set_direction(Direction::Left);
        assert_eq!(game.direction(), Direction::Up);

        game.advance();
        game.set_direction(Direction::Left);
        assert_eq!(game.direction(), Direction::Left);
    }

    #[test]
    fn test_reverse_of_unstepped_turn_rejected() {
        let mut game = running_game(20, 20);
        game.set_direction(Direction::Up);
        game.set_direction(game.direction().opposite());
        assert_eq!(game.direction(), Direction::Up);

        let head = game.snake.head();
        game.advance();
        assert_eq!(game.snake.head(), head.moved(Direction::Up));
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_degenerate_grid_is_playable() {
        let mut game = Game::with_seed(GridConfig::new(0, 5), 1);
        assert_eq!(game.grid().width(), 1);
        assert!(game.grid().contains(game.food()));

        game.start();
        assert_eq!(game.state(), GameState::Running);
        assert!(game.grid().contains(game.food()));
    }

    #[test]
    fn test_food_may_land_on_snake() {
        // On a 3x3 grid the starting body covers the whole bottom row.
        let landed_on_body = (0..100).any(|seed| {
            let mut game = Game::with_seed(GridConfig::new(3, 3), seed);
            game.start();
            game.snake.segments().contains(&game.food())
        });
        assert!(landed_on_body);
    }
}
