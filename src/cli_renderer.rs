use crate::entity::{Direction, Position};
use crate::game::{GameState, Snapshot};
use crate::renderer::{Input, Renderer};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::debug;
use std::io::{self, Write};
use std::time::Duration;

const BODY_COLOR: Color = Color::Rgb { r: 45, g: 180, b: 0 };

/// What occupies a grid cell in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Empty,
    Food,
    Body,
    Head,
}

/// Lay a snapshot out as rows of tiles. The snake is drawn over the food,
/// and segments outside the grid are skipped.
fn tiles(snapshot: &Snapshot<'_>) -> Vec<Vec<Tile>> {
    let grid = snapshot.grid;
    let mut rows = vec![vec![Tile::Empty; grid.width() as usize]; grid.height() as usize];

    let mut put = |pos: Position, tile: Tile| {
        if grid.contains(pos) {
            rows[pos.y as usize][pos.x as usize] = tile;
        }
    };

    put(snapshot.food, Tile::Food);
    for (i, &segment) in snapshot.body.iter().enumerate().rev() {
        put(segment, if i == 0 { Tile::Head } else { Tile::Body });
    }

    rows
}

fn overlay(state: GameState) -> &'static [&'static str] {
    match state {
        GameState::NotStarted => &["SNAKE", "Press ENTER to Start"],
        GameState::Paused => &["Paused", "Press P to Resume"],
        GameState::GameOver => &["Game Over", "Press ENTER to Restart"],
        GameState::Running => &[],
    }
}

/// Translate a key press into a game input.
pub fn map_key(key: KeyEvent) -> Option<Input> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }

    let input = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Input::Direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            Input::Direction(Direction::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            Input::Direction(Direction::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Input::Direction(Direction::Right)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Input::Pause,
        KeyCode::Enter => Input::Start,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Input::Quit,
        _ => return None,
    };
    Some(input)
}

/// Draws every frame it is handed; the caller's loop sets the pace.
pub struct CliRenderer {
    active: bool,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self { active: false }
    }

    /// Column at which `text` is centered over a grid `width` cells wide.
    fn centered_column(width: i32, text: &str) -> u16 {
        let columns = width.max(0) as usize * 2;
        let column = columns.saturating_sub(text.chars().count()) / 2;
        column.min(u16::MAX as usize) as u16
    }

    fn draw_tile(&self, tile: Tile, stdout: &mut io::Stdout) -> io::Result<()> {
        match tile {
            Tile::Empty => {
                queue!(stdout, SetBackgroundColor(Color::Black), Print("  "))?;
            }
            Tile::Food => {
                queue!(
                    stdout,
                    SetBackgroundColor(Color::Black),
                    SetForegroundColor(Color::Red),
                    Print("()")
                )?;
            }
            Tile::Body => {
                queue!(stdout, SetBackgroundColor(BODY_COLOR), Print("  "))?;
            }
            Tile::Head => {
                queue!(stdout, SetBackgroundColor(Color::Green), Print("  "))?;
            }
        }
        Ok(())
    }

    fn draw_score(&self, snapshot: &Snapshot<'_>, stdout: &mut io::Stdout) -> io::Result<()> {
        let score = format!("Score: {}", snapshot.score);
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            ResetColor,
            terminal::Clear(ClearType::CurrentLine),
            cursor::MoveTo(Self::centered_column(snapshot.grid.width(), &score), 0),
            SetForegroundColor(Color::Red),
            Print(score),
            ResetColor
        )?;
        Ok(())
    }

    fn draw_overlay(&self, snapshot: &Snapshot<'_>, stdout: &mut io::Stdout) -> io::Result<()> {
        let lines = overlay(snapshot.state);
        let top = (snapshot.grid.height() / 2 + 1) as u16;

        for (i, line) in lines.iter().enumerate() {
            let color = if i == 0 { Color::Red } else { Color::White };
            queue!(
                stdout,
                cursor::MoveTo(Self::centered_column(snapshot.grid.width(), line), top + i as u16),
                SetBackgroundColor(Color::Black),
                SetForegroundColor(color),
                Print(line),
                ResetColor
            )?;
        }
        Ok(())
    }

    fn draw_controls(&self, snapshot: &Snapshot<'_>, stdout: &mut io::Stdout) -> io::Result<()> {
        queue!(
            stdout,
            cursor::MoveTo(0, (snapshot.grid.height() + 1) as u16),
            ResetColor,
            Print("Arrows/WASD: move | P: pause | ENTER: start | ESC/Q: quit")
        )?;
        Ok(())
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        debug!("terminal initialised");
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let mut stdout = io::stdout();

        self.draw_score(snapshot, &mut stdout)?;

        for (y, row) in tiles(snapshot).iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16 + 1))?;
            for &tile in row {
                self.draw_tile(tile, &mut stdout)?;
            }
            queue!(stdout, ResetColor)?;
        }

        self.draw_overlay(snapshot, &mut stdout)?;
        self.draw_controls(snapshot, &mut stdout)?;

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        debug!("terminal restored");
        Ok(())
    }

    fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<Input>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(map_key(key));
            }
        }
        Ok(None)
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(map_key(press(KeyCode::Up)), Some(Input::Direction(Direction::Up)));
        assert_eq!(map_key(press(KeyCode::Down)), Some(Input::Direction(Direction::Down)));
        assert_eq!(map_key(press(KeyCode::Left)), Some(Input::Direction(Direction::Left)));
        assert_eq!(map_key(press(KeyCode::Right)), Some(Input::Direction(Direction::Right)));
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(map_key(press(KeyCode::Char('w'))), Some(Input::Direction(Direction::Up)));
        assert_eq!(map_key(press(KeyCode::Char('A'))), Some(Input::Direction(Direction::Left)));
        assert_eq!(map_key(press(KeyCode::Char('s'))), Some(Input::Direction(Direction::Down)));
        assert_eq!(map_key(press(KeyCode::Char('d'))), Some(Input::Direction(Direction::Right)));
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(map_key(press(KeyCode::Char('p'))), Some(Input::Pause));
        assert_eq!(map_key(press(KeyCode::Enter)), Some(Input::Start));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(Input::Quit));
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(Input::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Input::Quit)
        );
        assert_eq!(map_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let release = KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(map_key(release), None);
    }

    #[test]
    fn test_tiles_clip_offscreen_segments() {
        let body = [
            Position::new(1, 0),
            Position::new(0, 0),
            Position::new(-1, 0),
        ];
        let snapshot = Snapshot {
            body: &body,
            food: Position::new(2, 1),
            score: 0,
            state: GameState::Running,
            grid: GridConfig::new(3, 2),
        };

        let rows = tiles(&snapshot);
        assert_eq!(rows[0], vec![Tile::Body, Tile::Head, Tile::Empty]);
        assert_eq!(rows[1], vec![Tile::Empty, Tile::Empty, Tile::Food]);
    }

    #[test]
    fn test_snake_hides_food_underneath() {
        let body = [Position::new(0, 0), Position::new(1, 0)];
        let snapshot = Snapshot {
            body: &body,
            food: Position::new(1, 0),
            score: 3,
            state: GameState::Paused,
            grid: GridConfig::new(2, 1),
        };

        assert_eq!(tiles(&snapshot)[0], vec![Tile::Head, Tile::Body]);
    }

    #[test]
    fn test_overlay_per_state() {
        assert!(overlay(GameState::Running).is_empty());
        assert_eq!(overlay(GameState::GameOver)[0], "Game Over");
        assert_eq!(overlay(GameState::NotStarted)[1], "Press ENTER to Start");
        assert_eq!(overlay(GameState::Paused)[0], "Paused");
    }

    #[test]
    fn test_centered_column() {
        assert_eq!(CliRenderer::centered_column(10, "Score: 0"), 6);
        assert_eq!(CliRenderer::centered_column(2, "a very long line"), 0);
    }

    #[test]
    fn test_centered_column_huge_width_does_not_overflow() {
        assert_eq!(CliRenderer::centered_column(i32::MAX, "Score: 0"), u16::MAX);
        assert_eq!(CliRenderer::centered_column(-3, "Score: 0"), 0);
    }
}
