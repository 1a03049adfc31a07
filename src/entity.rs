/// A cell on the grid: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn moved(&self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Position::new(self.x, self.y - 1),
            Direction::Down => Position::new(self.x, self.y + 1),
            Direction::Left => Position::new(self.x - 1, self.y),
            Direction::Right => Position::new(self.x + 1, self.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Snake body, head first.
///
/// Nothing here prevents overlapping segments; the game checks for
/// self-collision after every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Position>,
}

impl Snake {
    /// Lay out `length` segments in a straight line, trailing away from `head`
    /// opposite to `heading`.
    pub fn new(head: Position, heading: Direction, length: usize) -> Self {
        let back = heading.opposite();
        let mut body = Vec::with_capacity(length.max(1));
        body.push(head);
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved(back));
        }
        Self { body }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> &[Position] {
        &self.body
    }

    /// Move one cell in `direction`. Every segment takes its predecessor's
    /// cell, walking from the tail towards the head so nothing is read after
    /// being overwritten. Returns the cell the tail just left.
    pub fn slither(&mut self, direction: Direction) -> Position {
        let last = self.body.len() - 1;
        let vacated = self.body[last];
        for i in (1..=last).rev() {
            self.body[i] = self.body[i - 1];
        }
        self.body[0] = self.body[0].moved(direction);
        vacated
    }

    /// Re-occupy the cell the tail vacated on the last move.
    pub fn grow_into(&mut self, vacated: Position) {
        self.body.push(vacated);
    }

    /// Whether any segment other than the head sits on the head's cell.
    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body[1..].contains(&head)
    }
}
