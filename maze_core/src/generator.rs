//! Procedural maze generation.
//!
//! The default [`GenerationStyle::Backtracking`] style works in two phases:
//!
//! 1. Carve a perfect maze by iterative backtracking on odd coordinates,
//!    opening the mortar cell between each carved pair.
//! 2. Perturb it: stamp small open patterns, knock out walls next to open
//!    floor, dig straight dead ends and drop small wall islands.
//!
//! The perturbations can cut the start off from the end, so generation
//! always finishes with a reachability check and, if needed, forces a
//! staircase route between the two.

use std::ops::RangeInclusive;

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    map::{DimensionError, Grid},
    maze::{Cell, Maze, MazeError},
    solver::is_reachable,
};

/// Smallest legal side length: a border on each side of one interior cell.
pub const MIN_SIDE: usize = 3;

/// How the initial layout is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationStyle {
    /// Backtracking carve followed by the complexity phase.
    #[default]
    Backtracking,
    /// Independent random walls inside the border, then a forced staircase route.
    Scatter,
}

/// Tunables for maze generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub style: GenerationStyle,
    /// Run the complexity phase after carving. Ignored by [`GenerationStyle::Scatter`].
    pub complexity: bool,
    pub pattern_count: RangeInclusive<usize>,
    pub wall_removal_chance: f64,
    pub dead_end_chance: f64,
    pub dead_end_length: RangeInclusive<usize>,
    pub island_count: RangeInclusive<usize>,
    /// Chance that an island also walls the cells right of and below its anchor.
    pub island_spread_chance: f64,
    pub scatter_wall_density: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            style: GenerationStyle::Backtracking,
            complexity: true,
            pattern_count: 3..=7,
            wall_removal_chance: 0.5,
            dead_end_chance: 0.2,
            dead_end_length: 2..=4,
            island_count: 3..=7,
            island_spread_chance: 0.5,
            scatter_wall_density: 0.3,
        }
    }
}

impl GeneratorConfig {
    /// Checks probabilities lie in `[0, 1]` and ranges are non-empty.
    pub fn validate(&self) -> Result<(), MazeError> {
        let chances = [
            ("wall_removal_chance", self.wall_removal_chance),
            ("dead_end_chance", self.dead_end_chance),
            ("island_spread_chance", self.island_spread_chance),
            ("scatter_wall_density", self.scatter_wall_density),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(MazeError::InvalidConfig {
                    name,
                    detail: format!("probability {value} is outside [0, 1]"),
                });
            }
        }

        let ranges = [
            ("pattern_count", &self.pattern_count),
            ("dead_end_length", &self.dead_end_length),
            ("island_count", &self.island_count),
        ];
        for (name, range) in ranges {
            if range.is_empty() {
                return Err(MazeError::InvalidConfig {
                    name,
                    detail: format!("range {}..={} is empty", range.start(), range.end()),
                });
            }
        }
        if *self.dead_end_length.start() == 0 {
            return Err(MazeError::InvalidConfig {
                name: "dead_end_length",
                detail: "dead ends must be at least one cell long".to_string(),
            });
        }
        Ok(())
    }
}

/// Open-cell templates stamped during the complexity phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Cross,
    Tee,
    Spiral,
}

impl Pattern {
    const ALL: [Pattern; 3] = [Pattern::Cross, Pattern::Tee, Pattern::Spiral];

    /// `(row, col)` offsets from the anchor.
    fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Pattern::Cross => &[(0, 0), (0, -1), (0, 1), (-1, 0), (1, 0)],
            Pattern::Tee => &[(0, -1), (0, 0), (0, 1), (1, 0)],
            Pattern::Spiral => &[
                (0, 0),
                (0, 1),
                (1, 1),
                (1, 0),
                (1, -1),
                (2, -1),
                (2, 0),
                (2, 1),
                (3, 1),
            ],
        }
    }
}

/// Generates mazes from an injected random source.
///
/// The same source state and configuration always produce the same maze.
#[derive(Debug)]
pub struct MazeGenerator<R: Rng> {
    rng: R,
    config: GeneratorConfig,
}

impl MazeGenerator<StdRng> {
    /// Creates a generator backed by [`StdRng`].
    ///
    /// Without a seed one is drawn from the thread-local generator and logged,
    /// so any run can be replayed.
    pub fn seeded(seed: Option<u64>, config: GeneratorConfig) -> Result<Self, MazeError> {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        debug!("Maze generator seed: {seed}");
        Self::new(StdRng::seed_from_u64(seed), config)
    }
}

impl<R: Rng> MazeGenerator<R> {
    pub fn new(rng: R, config: GeneratorConfig) -> Result<Self, MazeError> {
        config.validate()?;
        Ok(MazeGenerator { rng, config })
    }

    /// Generates a `rows x cols` maze.
    ///
    /// The start is always at (1, 1) and the end at (rows - 2, cols - 2), with
    /// a route between them. In a 3x3 maze both sit on the single interior
    /// cell, which is stored as the end.
    pub fn generate(&mut self, rows: usize, cols: usize) -> Result<Maze, MazeError> {
        if rows < MIN_SIDE || cols < MIN_SIDE {
            return Err(DimensionError::TooSmall { rows, cols }.into());
        }
        let start = Position::new(1, 1);
        let end = Position::new(rows - 2, cols - 2);

        let mut cells = match self.config.style {
            GenerationStyle::Backtracking => {
                let mut cells = self.carve_passages(rows, cols)?;
                if self.config.complexity {
                    self.add_complexity(&mut cells);
                }
                if !is_reachable(&cells, start, end) {
                    debug!("End {end} unreachable from {start}, forcing a route");
                    force_route(&mut cells, start, end);
                }
                cells
            }
            GenerationStyle::Scatter => {
                let mut cells = self.scatter(rows, cols)?;
                cells[start] = Cell::Start;
                cells[end] = Cell::End;
                force_route(&mut cells, start, end);
                cells
            }
        };

        cells[start] = Cell::Start;
        cells[end] = Cell::End;
        debug!(
            "Generated {rows}x{cols} maze with {} open cells",
            cells.iter().filter(|cell| cell.is_passable()).count()
        );
        Ok(Maze::from_parts(cells, start, end))
    }

    fn shuffled_directions(&mut self) -> [Direction; 4] {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);
        directions
    }

    /// Carves a perfect maze from (1, 1), moving two cells at a time.
    ///
    /// Uses an explicit stack of `(cell, shuffled directions, next index)`
    /// frames in place of recursion.
    pub(crate) fn carve_passages(
        &mut self,
        rows: usize,
        cols: usize,
    ) -> Result<Grid<Cell>, DimensionError> {
        let mut cells = Grid::try_filled(rows, cols, Cell::Wall)?;
        let origin = Position::new(1, 1);
        cells[origin] = Cell::Open;

        let mut stack = vec![(origin, self.shuffled_directions(), 0usize)];
        while let Some((current, directions, cursor)) = stack.last_mut() {
            let Some(&direction) = directions.get(*cursor) else {
                stack.pop();
                continue;
            };
            *cursor += 1;
            let current = *current;

            let (Some(mortar), Some(target)) =
                (current.step(direction), current.offset(direction, 2))
            else {
                continue;
            };
            if cells.is_interior(target) && cells[target] == Cell::Wall {
                cells[mortar] = Cell::Open;
                cells[target] = Cell::Open;
                let directions = self.shuffled_directions();
                stack.push((target, directions, 0));
            }
        }
        debug!("Carved {rows}x{cols} passages");
        Ok(cells)
    }

    fn add_complexity(&mut self, cells: &mut Grid<Cell>) {
        self.stamp_patterns(cells);
        self.remove_walls(cells);
        self.extend_dead_ends(cells);
        self.drop_wall_islands(cells);
    }

    /// Stamps crosses, tees and spirals of open floor at random anchors.
    fn stamp_patterns(&mut self, cells: &mut Grid<Cell>) {
        let row_range = 3..cells.rows().saturating_sub(3);
        let col_range = 3..cells.cols().saturating_sub(3);
        if row_range.is_empty() || col_range.is_empty() {
            return;
        }

        let count = self.rng.random_range(self.config.pattern_count.clone());
        let mut stamped = 0;
        for _ in 0..count {
            let anchor = Position::new(
                self.rng.random_range(row_range.clone()),
                self.rng.random_range(col_range.clone()),
            );
            let pattern = Pattern::ALL[self.rng.random_range(0..Pattern::ALL.len())];
            if stamp_pattern(cells, anchor, pattern) {
                stamped += 1;
            }
        }
        debug!("Stamped {stamped} of {count} patterns");
    }

    /// Opens interior walls that touch open floor, each with a fixed chance.
    fn remove_walls(&mut self, cells: &mut Grid<Cell>) {
        let chance = self.config.wall_removal_chance;
        for pos in interior_positions(cells) {
            if cells[pos] == Cell::Wall
                && self.rng.random_bool(chance)
                && cells.neighbors(pos).any(|next| cells[next] == Cell::Open)
            {
                cells[pos] = Cell::Open;
            }
        }
    }

    fn extend_dead_ends(&mut self, cells: &mut Grid<Cell>) {
        let chance = self.config.dead_end_chance;
        for pos in interior_positions(cells) {
            if cells[pos] == Cell::Open && self.rng.random_bool(chance) {
                self.extend_dead_end(cells, pos);
            }
        }
    }

    /// Digs one straight branch from `origin` through walls only.
    ///
    /// Directions are tried in shuffled order with a fresh random length each;
    /// the first run that stays inside the border without meeting open floor
    /// is carved.
    fn extend_dead_end(&mut self, cells: &mut Grid<Cell>, origin: Position) {
        for direction in self.shuffled_directions() {
            let length = self.rng.random_range(self.config.dead_end_length.clone());
            let run: Option<Vec<Position>> = (1..=length)
                .map(|distance| {
                    origin
                        .offset(direction, distance)
                        .filter(|pos| cells.is_interior(*pos) && cells[*pos] != Cell::Open)
                })
                .collect();
            if let Some(run) = run {
                for pos in run {
                    cells[pos] = Cell::Open;
                }
                return;
            }
        }
    }

    /// Turns random open anchors back into walls, sometimes with their right
    /// and lower neighbors too.
    fn drop_wall_islands(&mut self, cells: &mut Grid<Cell>) {
        let row_range = 2..cells.rows().saturating_sub(2);
        let col_range = 2..cells.cols().saturating_sub(2);
        if row_range.is_empty() || col_range.is_empty() {
            return;
        }

        let count = self.rng.random_range(self.config.island_count.clone());
        for _ in 0..count {
            let anchor = Position::new(
                self.rng.random_range(row_range.clone()),
                self.rng.random_range(col_range.clone()),
            );
            let (Some(right), Some(below)) =
                (anchor.step(Direction::Right), anchor.step(Direction::Down))
            else {
                continue;
            };
            if cells[anchor] != Cell::Open || !cells.is_interior(right) || !cells.is_interior(below)
            {
                continue;
            }
            cells[anchor] = Cell::Wall;
            if self.rng.random_bool(self.config.island_spread_chance) {
                cells[right] = Cell::Wall;
                cells[below] = Cell::Wall;
            }
        }
    }

    /// Walls the border and makes each interior cell a wall with the
    /// configured density.
    fn scatter(&mut self, rows: usize, cols: usize) -> Result<Grid<Cell>, DimensionError> {
        let density = self.config.scatter_wall_density;
        let rng = &mut self.rng;
        Grid::from_generator(rows, cols, |pos| {
            let border = pos.row == 0 || pos.col == 0 || pos.row == rows - 1 || pos.col == cols - 1;
            if border || rng.random_bool(density) {
                Cell::Wall
            } else {
                Cell::Open
            }
        })
    }
}

/// Generates a maze with the default configuration.
///
/// Pass a seed for a reproducible maze.
pub fn generate(rows: usize, cols: usize, seed: Option<u64>) -> Result<Maze, MazeError> {
    MazeGenerator::seeded(seed, GeneratorConfig::default())?.generate(rows, cols)
}

fn interior_positions(cells: &Grid<Cell>) -> impl Iterator<Item = Position> + use<> {
    let (rows, cols) = (cells.rows(), cells.cols());
    (1..rows.saturating_sub(1))
        .flat_map(move |row| (1..cols.saturating_sub(1)).map(move |col| Position::new(row, col)))
}

/// Opens every cell of `pattern` around `anchor`, or nothing if any of them
/// falls outside the interior. Returns whether the pattern was stamped.
fn stamp_pattern(cells: &mut Grid<Cell>, anchor: Position, pattern: Pattern) -> bool {
    let targets: Option<Vec<Position>> = pattern
        .offsets()
        .iter()
        .map(|&(dr, dc)| anchor.translate(dr, dc).filter(|pos| cells.is_interior(*pos)))
        .collect();
    let Some(targets) = targets else {
        return false;
    };
    for pos in targets {
        cells[pos] = Cell::Open;
    }
    true
}

/// Opens a staircase from `from` to `to`: rows first, then columns.
///
/// Endpoint cells on the way keep their markers.
fn force_route(cells: &mut Grid<Cell>, from: Position, to: Position) {
    let mut current = from;
    while current != to {
        if current.row != to.row {
            current.row = if current.row < to.row {
                current.row + 1
            } else {
                current.row - 1
            };
        } else if current.col < to.col {
            current.col += 1;
        } else {
            current.col -= 1;
        }
        if let Some(cell) = cells.get_mut(current) {
            if !cell.is_endpoint() {
                *cell = Cell::Open;
            }
        }
    }
}
