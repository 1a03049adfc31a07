#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};
    use crossterm::terminal;
    use log::{info, warn, LevelFilter};
    use simplelog::{Config, WriteLogger};
    use snake::{dispatch, CliRenderer, Flow, Game, GridConfig, Renderer, Ticker, FPS};
    use std::fs::File;
    use std::path::PathBuf;
    use std::time::Instant;

    // Smallest grid that still leaves room to turn around.
    const MIN_COLUMNS: i32 = 10;
    const MIN_ROWS: i32 = 10;

    #[derive(Parser)]
    #[command(name = "snake-cli")]
    #[command(version, about = "Snake in the terminal")]
    struct Cli {
        /// Grid width in cells (defaults to the terminal width)
        #[arg(long)]
        width: Option<i32>,

        /// Grid height in cells (defaults to the terminal height)
        #[arg(long)]
        height: Option<i32>,

        /// Seed for food placement, for reproducible games
        #[arg(long)]
        seed: Option<u64>,

        /// File the game log is written to
        #[arg(long, default_value = "snake.log")]
        log_file: PathBuf,

        /// How much detail goes to the log file
        #[arg(long, default_value = "info")]
        log_level: LogLevel,
    }

    #[derive(Clone, Copy, ValueEnum)]
    enum LogLevel {
        Off,
        Error,
        Warn,
        Info,
        Debug,
        Trace,
    }

    impl From<LogLevel> for LevelFilter {
        fn from(level: LogLevel) -> Self {
            match level {
                LogLevel::Off => LevelFilter::Off,
                LogLevel::Error => LevelFilter::Error,
                LogLevel::Warn => LevelFilter::Warn,
                LogLevel::Info => LevelFilter::Info,
                LogLevel::Debug => LevelFilter::Debug,
                LogLevel::Trace => LevelFilter::Trace,
            }
        }
    }

    /// Cells along one axis: the requested count, or everything `available`,
    /// kept between `min` and what the terminal can show.
    fn fit_cells(requested: Option<i32>, available: i32, min: i32) -> i32 {
        let max = available.max(min);
        requested.unwrap_or(available).clamp(min, max)
    }

    /// Grid that fills the terminal. Each cell is 2 chars wide; one line on
    /// top holds the score and one at the bottom the controls.
    fn terminal_grid(cli: &Cli) -> Result<GridConfig> {
        let (term_width, term_height) = terminal::size().context("Failed to read terminal size")?;
        let width = fit_cells(cli.width, (term_width / 2) as i32, MIN_COLUMNS);
        let height = fit_cells(cli.height, term_height.saturating_sub(2) as i32, MIN_ROWS);
        if cli.width.is_some_and(|w| w != width) || cli.height.is_some_and(|h| h != height) {
            warn!("requested grid size adjusted to {}x{}", width, height);
        }
        Ok(GridConfig::new(width, height))
    }

    fn run_loop(game: &mut Game, renderer: &mut CliRenderer) -> Result<()> {
        let mut ticker = Ticker::new(FPS);
        let started = Instant::now();

        renderer
            .render(&game.snapshot())
            .context("Failed to draw frame")?;

        loop {
            let wait = ticker.until_next(started.elapsed());
            if let Some(input) = renderer
                .poll_input(wait)
                .context("Failed to read input")?
            {
                if dispatch(game, input) == Flow::Quit {
                    info!("quit at score {}", game.score());
                    return Ok(());
                }
            }

            let due = ticker.due(started.elapsed());
            if due == 0 {
                continue;
            }
            for _ in 0..due {
                game.tick();
            }

            renderer
                .render(&game.snapshot())
                .context("Failed to draw frame")?;
        }
    }

    pub fn main() -> Result<()> {
        let cli = Cli::parse();

        let log_file = File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
        WriteLogger::init(cli.log_level.into(), Config::default(), log_file)
            .context("Failed to initialize logger")?;

        let grid = terminal_grid(&cli)?;
        let mut game = match cli.seed {
            Some(seed) => Game::with_seed(grid, seed),
            None => Game::new(grid),
        };
        info!("snake-cli starting with a {}x{} grid", grid.width(), grid.height());

        let mut renderer = CliRenderer::new();
        renderer.init().context("Failed to set up terminal")?;

        let result = run_loop(&mut game, &mut renderer);

        renderer.cleanup().context("Failed to restore terminal")?;
        result
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::main()
}

// The browser build runs from `web_main::start_game` instead.
#[cfg(target_arch = "wasm32")]
fn main() {}
