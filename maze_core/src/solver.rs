use std::{
    collections::{HashMap, VecDeque},
    fmt,
    time::{Duration, Instant},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    map::Grid,
    maze::{Cell, Maze, MazeError, is_passable, locate_endpoints},
};

/// The result of one solve call.
///
/// `found()` is true exactly when `path()` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveOutcome {
    strategy: Strategy,
    found: bool,
    path: Vec<Position>,
    visited: usize,
    elapsed: Duration,
}

impl SolveOutcome {
    fn new(strategy: Strategy, path: Vec<Position>, visited: usize, elapsed: Duration) -> Self {
        SolveOutcome {
            strategy,
            found: !path.is_empty(),
            path,
            visited,
            elapsed,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn found(&self) -> bool {
        self.found
    }

    /// The route from start to end inclusive, empty if none was found.
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Route length in cells, 0 when no route was found.
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Number of cells the search explored.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.0
    }

    pub fn into_path(self) -> Vec<Position> {
        self.path
    }
}

/// A search strategy over a grid of cells.
///
/// Implementations only read the grid. Each call owns its own scratch
/// structures, so one grid can be searched by several solvers at once.
pub trait Solver {
    /// Which strategy this solver implements.
    fn strategy(&self) -> Strategy;

    /// Searches from `start` to `end`.
    ///
    /// Returns the route (empty if `end` is unreachable) and the number of
    /// cells explored.
    fn search(&self, grid: &Grid<Cell>, start: Position, end: Position) -> (Vec<Position>, usize);

    /// Solves a validated maze, timing the search.
    fn solve(&self, maze: &Maze) -> SolveOutcome {
        timed(self, maze.cells(), maze.start(), maze.end())
    }

    /// Solves a raw grid, locating its endpoints first.
    fn solve_grid(&self, grid: &Grid<Cell>) -> Result<SolveOutcome, MazeError> {
        let (start, end) = locate_endpoints(grid)?;
        Ok(timed(self, grid, start, end))
    }
}

fn timed<S: Solver + ?Sized>(
    solver: &S,
    grid: &Grid<Cell>,
    start: Position,
    end: Position,
) -> SolveOutcome {
    let started = Instant::now();
    let (path, visited) = solver.search(grid, start, end);
    let outcome = SolveOutcome::new(solver.strategy(), path, visited, started.elapsed());
    if outcome.found() {
        info!(
            "{}: {} cells visited, path of {} cells, {:.3} ms",
            outcome.strategy,
            outcome.visited,
            outcome.path_len(),
            outcome.elapsed_ms()
        );
    } else {
        info!(
            "{}: {} cells visited, no path found, {:.3} ms",
            outcome.strategy,
            outcome.visited,
            outcome.elapsed_ms()
        );
    }
    outcome
}

/// Depth-first search with an explicit stack.
///
/// Finds some route if one exists, not necessarily the shortest. Every cell
/// pushed counts as visited, including those later abandoned on backtrack.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirst;

impl Solver for DepthFirst {
    fn strategy(&self) -> Strategy {
        Strategy::DepthFirst
    }

    fn search(&self, grid: &Grid<Cell>, start: Position, end: Position) -> (Vec<Position>, usize) {
        if !is_passable(grid, start) {
            return (Vec::new(), 0);
        }

        let mut visited = Grid::filled(grid.rows(), grid.cols(), false);
        visited[start] = true;
        let mut visited_count = 1;

        // Each frame is a cell on the current route and the index of the next
        // direction to try from it.
        let mut stack: Vec<(Position, usize)> = vec![(start, 0)];
        let mut found = false;

        while let Some((current, cursor)) = stack.last_mut() {
            if *current == end {
                found = true;
                break;
            }
            let Some(&direction) = Direction::ALL.get(*cursor) else {
                stack.pop();
                continue;
            };
            *cursor += 1;

            let Some(next) = current.step(direction) else {
                continue;
            };
            if is_passable(grid, next) && !visited[next] {
                visited[next] = true;
                visited_count += 1;
                stack.push((next, 0));
            }
        }

        if !found {
            return (Vec::new(), visited_count);
        }
        let path = stack.into_iter().map(|(pos, _)| pos).collect();
        (path, visited_count)
    }
}

/// Breadth-first search.
///
/// The route has the fewest cells of any start-to-end route. Cells count as
/// visited when dequeued.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirst;

impl BreadthFirst {
    fn reconstruct_path(
        came_from: &HashMap<Position, Position>,
        start: Position,
        end: Position,
    ) -> Vec<Position> {
        let mut path = vec![end];
        let mut current = end;
        while current != start {
            match came_from.get(&current) {
                Some(&previous) => {
                    current = previous;
                    path.push(current);
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

impl Solver for BreadthFirst {
    fn strategy(&self) -> Strategy {
        Strategy::BreadthFirst
    }

    fn search(&self, grid: &Grid<Cell>, start: Position, end: Position) -> (Vec<Position>, usize) {
        if !is_passable(grid, start) {
            return (Vec::new(), 0);
        }

        let mut visited = Grid::filled(grid.rows(), grid.cols(), false);
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut frontier = VecDeque::from([start]);
        visited[start] = true;
        let mut dequeued = 0;

        while let Some(current) = frontier.pop_front() {
            dequeued += 1;
            if current == end {
                return (Self::reconstruct_path(&came_from, start, end), dequeued);
            }

            for next in grid.neighbors(current) {
                if !visited[next] && grid[next].is_passable() {
                    visited[next] = true;
                    came_from.insert(next, current);
                    frontier.push_back(next);
                }
            }
        }

        (Vec::new(), dequeued)
    }
}

/// Selects one of the two solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    DepthFirst,
    BreadthFirst,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::DepthFirst, Strategy::BreadthFirst];

    pub fn solver(self) -> &'static dyn Solver {
        match self {
            Strategy::DepthFirst => &DepthFirst,
            Strategy::BreadthFirst => &BreadthFirst,
        }
    }

    pub fn solve(self, maze: &Maze) -> SolveOutcome {
        self.solver().solve(maze)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DepthFirst => write!(f, "DFS"),
            Strategy::BreadthFirst => write!(f, "BFS"),
        }
    }
}

pub fn solve_dfs(maze: &Maze) -> SolveOutcome {
    DepthFirst.solve(maze)
}

pub fn solve_bfs(maze: &Maze) -> SolveOutcome {
    BreadthFirst.solve(maze)
}

/// Checks whether `to` can be reached from `from` without crossing a wall.
pub(crate) fn is_reachable(grid: &Grid<Cell>, from: Position, to: Position) -> bool {
    let (path, _) = BreadthFirst.search(grid, from, to);
    !path.is_empty()
}
