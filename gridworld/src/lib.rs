use itertools::Itertools;
use serde_json::{json, Value};
use std::collections::HashSet;
use thiserror::Error;

pub type Discrete = i32;
pub type Continous = f64;

/// (row, col) coordinate on the grid.
pub type Position = (Discrete, Discrete);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridWorldError {
    #[error("layout has no rows")]
    EmptyLayout,

    #[error("layout rows must have equal widths: row {row} is {found} wide, expected {expected}")]
    RaggedLayout {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unrecognized cell symbol: {0:?}")]
    UnknownSymbol(char),

    #[error("layout must have exactly one {symbol:?} cell, found {count}")]
    CellCount { symbol: char, count: usize },

    #[error("not a legal action index: {0}")]
    IllegalAction(Discrete),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Start,
    Goal,
    Wall,
    Free,
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Result<Self, GridWorldError> {
        match symbol {
            'S' => Ok(Self::Start),
            'G' => Ok(Self::Goal),
            'W' => Ok(Self::Wall),
            '-' => Ok(Self::Free),
            e => Err(GridWorldError::UnknownSymbol(e)),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Start => 'S',
            Self::Goal => 'G',
            Self::Wall => 'W',
            Self::Free => '-',
        }
    }
}

/// The four grid moves, in the action-index order 0..4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector in (row, col) space.
    pub fn delta(self) -> (Discrete, Discrete) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

impl TryFrom<Discrete> for Action {
    type Error = GridWorldError;

    fn try_from(value: Discrete) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Up),
            1 => Ok(Self::Down),
            2 => Ok(Self::Left),
            3 => Ok(Self::Right),
            e => Err(GridWorldError::IllegalAction(e)),
        }
    }
}

/// A rectangular grid layout parsed into cell roles. Immutable once built.
#[derive(Debug, Clone)]
pub struct GridModel {
    height: Discrete,
    width: Discrete,
    cells: Vec<Cell>,
    start: Position,
    goal: Position,
    walls: HashSet<Position>,
    free_cells: HashSet<Position>,
}

impl GridModel {
    /// Parses rows of 'S'/'G'/'W'/'-' symbols. All rows must have the same
    /// width and the layout must contain exactly one 'S' and one 'G'.
    pub fn parse(rows: &[&str]) -> Result<Self, GridWorldError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(GridWorldError::EmptyLayout);
        }

        let width = rows[0].chars().count();
        let mut cells = Vec::with_capacity(rows.len() * width);
        for (row, text) in rows.iter().enumerate() {
            let found = text.chars().count();
            if found != width {
                return Err(GridWorldError::RaggedLayout {
                    row,
                    found,
                    expected: width,
                });
            }
            for symbol in text.chars() {
                cells.push(Cell::from_symbol(symbol)?);
            }
        }

        let height = rows.len() as Discrete;
        let width = width as Discrete;

        let positions_of = |role: Cell| {
            (0..height)
                .cartesian_product(0..width)
                .filter(|&(x, y)| cells[(x * width + y) as usize] == role)
                .collect::<Vec<_>>()
        };

        let start = Self::single(positions_of(Cell::Start), 'S')?;
        let goal = Self::single(positions_of(Cell::Goal), 'G')?;
        let walls = positions_of(Cell::Wall).into_iter().collect();

        // Cells the agent may occupy: blanks plus start and goal.
        let mut free_cells: HashSet<_> = positions_of(Cell::Free).into_iter().collect();
        free_cells.insert(start);
        free_cells.insert(goal);

        Ok(Self {
            height,
            width,
            cells,
            start,
            goal,
            walls,
            free_cells,
        })
    }

    fn single(found: Vec<Position>, symbol: char) -> Result<Position, GridWorldError> {
        if found.len() != 1 {
            return Err(GridWorldError::CellCount {
                symbol,
                count: found.len(),
            });
        }

        Ok(found[0])
    }

    pub fn height(&self) -> Discrete {
        self.height
    }

    pub fn width(&self) -> Discrete {
        self.width
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn walls(&self) -> &HashSet<Position> {
        &self.walls
    }

    pub fn free_cells(&self) -> &HashSet<Position> {
        &self.free_cells
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }

        Some(self.cells[(pos.0 * self.width + pos.1) as usize])
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        (0..self.height).contains(&pos.0) && (0..self.width).contains(&pos.1)
    }

    /// All coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        (0..self.height).cartesian_product(0..self.width)
    }

    /// Dense bijection from coordinates to state ids in [0, height * width).
    pub fn state_index(&self, pos: Position) -> usize {
        (pos.0 * self.width + pos.1) as usize
    }

    pub fn n_states(&self) -> usize {
        (self.height * self.width) as usize
    }
}

#[derive(Debug)]
pub struct StepInfo {
    pub observation: Position,
    pub reward: Continous,
    pub done: bool,
    pub info: Value,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EpisodeEvent {
    pub s: Position,
    pub r: Continous,
}

/// A deterministic step-based MDP over a grid layout. All stochastic action
/// selection is the caller's responsibility; the environment itself never
/// draws random numbers.
#[derive(Debug, Clone)]
pub struct Environment {
    model: GridModel,
    current_position: Position,
}

impl Environment {
    pub fn new(model: GridModel) -> Self {
        let current_position = model.start();
        Self {
            model,
            current_position,
        }
    }

    pub fn from_layout(rows: &[&str]) -> Result<Self, GridWorldError> {
        Ok(Self::new(GridModel::parse(rows)?))
    }

    pub fn model(&self) -> &GridModel {
        &self.model
    }

    pub fn current_position(&self) -> Position {
        self.current_position
    }

    pub fn n_s(&self) -> usize {
        self.model.n_states()
    }

    pub fn n_a(&self) -> usize {
        Action::ALL.len()
    }

    /// Puts the agent back on the start cell. Begins an episode.
    pub fn reset(&mut self) -> StepInfo {
        self.current_position = self.model.start();

        StepInfo {
            observation: self.current_position,
            reward: 0.,
            done: false,
            info: json!({}),
        }
    }

    /// Moves the agent by one action. A candidate cell that is a wall or out
    /// of bounds is rejected and the agent stays in place. Reward is 1 on the
    /// step that lands on the goal, -1 otherwise; the episode is done once
    /// the agent is on the goal.
    pub fn step(&mut self, action: Action) -> StepInfo {
        let (dx, dy) = action.delta();
        let candidate = (self.current_position.0 + dx, self.current_position.1 + dy);

        if self.model.free_cells().contains(&candidate) {
            self.current_position = candidate;
        }

        let done = self.current_position == self.model.goal();
        let reward = if done { 1. } else { -1. };

        StepInfo {
            observation: self.current_position,
            reward,
            done,
            // Diagnostics only, not part of the MDP contract.
            info: json!({ "goes_to": self.current_position, "by_going": action.name() }),
        }
    }

    /// Text rendering of the grid with the agent marked 'X', for display
    /// collaborators.
    pub fn render_ansi(&self) -> String {
        (0..self.model.height())
            .map(|x| {
                let row = (0..self.model.width())
                    .map(|y| {
                        if (x, y) == self.current_position {
                            'X'
                        } else {
                            self.model.cell((x, y)).unwrap().symbol()
                        }
                    })
                    .join("|");
                format!("|{row}|")
            })
            .join("\n")
    }
}
