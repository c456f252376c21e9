use maze_core::{
    Cell, DimensionError, Endpoint, GenerationStyle, GeneratorConfig, Maze, MazeError,
    MazeGenerator, Position, Strategy, generate, render, render_text, solve_bfs, solve_dfs,
};
use rand::{SeedableRng, rngs::StdRng};

const SAMPLE: [&str; 5] = ["######", "S=#==#", "#=#=##", "#===E#", "######"];

fn sample_maze() -> Maze {
    Maze::parse(&SAMPLE.join("\n")).unwrap()
}

fn path(cells: &[(usize, usize)]) -> Vec<Position> {
    cells.iter().map(|&(row, col)| Position::new(row, col)).collect()
}

fn classification(maze: &Maze) -> Vec<Vec<Cell>> {
    maze.cells().to_rows()
}

#[test]
fn sample_grid_bfs_route() {
    let maze = sample_maze();
    let outcome = solve_bfs(&maze);
    assert!(outcome.found());
    assert_eq!(outcome.path_len(), 7);
    assert_eq!(
        outcome.path(),
        path(&[(1, 0), (1, 1), (2, 1), (3, 1), (3, 2), (3, 3), (3, 4)]).as_slice()
    );
}

#[test]
fn sample_grid_dfs_route() {
    let outcome = solve_dfs(&sample_maze());
    assert!(outcome.found());
    assert!(outcome.path_len() >= 7);
}

#[test]
fn unequal_rows_fail_with_invalid_dimensions() {
    let err = Maze::parse("S==\n==\n==E").unwrap_err();
    assert_eq!(
        err,
        MazeError::InvalidDimensions(DimensionError::RaggedRow {
            row: 1,
            expected: 3,
            found: 2
        })
    );
}

#[test]
fn start_without_end_fails_with_missing_endpoint() {
    let rows = vec![
        vec![Cell::Wall, Cell::Wall, Cell::Wall],
        vec![Cell::Start, Cell::Open, Cell::Wall],
        vec![Cell::Wall, Cell::Wall, Cell::Wall],
    ];
    assert_eq!(
        Maze::from_rows(rows),
        Err(MazeError::MissingEndpoint(Endpoint::End))
    );
}

#[test]
fn empty_rows_fail_with_invalid_dimensions() {
    assert_eq!(
        Maze::from_rows(Vec::new()),
        Err(MazeError::InvalidDimensions(DimensionError::Empty))
    );
}

#[test]
fn every_generated_maze_is_solvable() {
    for seed in 0..200 {
        for (rows, cols) in [(5, 5), (11, 11), (21, 31), (20, 14), (9, 4)] {
            let maze = generate(rows, cols, Some(seed)).unwrap();
            assert_eq!(maze.start(), Position::new(1, 1));
            assert_eq!(maze.end(), Position::new(rows - 2, cols - 2));
            let outcome = solve_bfs(&maze);
            assert!(outcome.found(), "seed {seed} produced an unsolvable {rows}x{cols} maze");
        }
    }
}

#[test]
fn generated_mazes_hold_exactly_one_start_and_end() {
    for seed in 0..50 {
        let maze = generate(17, 23, Some(seed)).unwrap();
        let count = |target: Cell| maze.cells().iter().filter(|c| **c == target).count();
        assert_eq!(count(Cell::Start), 1);
        assert_eq!(count(Cell::End), 1);
        assert_eq!(count(Cell::Path), 0);
    }
}

#[test]
fn carving_only_yields_a_perfect_maze() {
    let config = GeneratorConfig {
        complexity: false,
        ..GeneratorConfig::default()
    };
    for seed in 0..50 {
        let mut generator = MazeGenerator::new(StdRng::seed_from_u64(seed), config.clone()).unwrap();
        let maze = generator.generate(15, 21).unwrap();
        let cells = maze.cells();

        let mut open = 0;
        let mut edges = 0;
        for (pos, cell) in cells.enumerate() {
            if !cell.is_passable() {
                continue;
            }
            open += 1;
            let right = Position::new(pos.row, pos.col + 1);
            let below = Position::new(pos.row + 1, pos.col);
            edges += usize::from(maze.is_passable(right)) + usize::from(maze.is_passable(below));
        }
        assert_eq!(open, edges + 1, "seed {seed} carved a cycle or a split");

        // Move the end onto a sealed border corner so BFS exhausts the open region.
        let mut rows = cells.to_rows();
        rows[13][19] = Cell::Open;
        rows[0][0] = Cell::End;
        let sealed = Maze::from_rows(rows).unwrap();
        let outcome = solve_bfs(&sealed);
        assert!(!outcome.found());
        assert_eq!(outcome.visited(), open, "seed {seed} left open cells unreachable");
    }
}

#[test]
fn bfs_is_never_longer_than_dfs() {
    for seed in 0..100 {
        let maze = generate(19, 27, Some(seed)).unwrap();
        let bfs = solve_bfs(&maze);
        let dfs = solve_dfs(&maze);
        assert!(bfs.found() && dfs.found());
        assert!(
            bfs.path_len() <= dfs.path_len(),
            "seed {seed}: BFS {} > DFS {}",
            bfs.path_len(),
            dfs.path_len()
        );
        assert_eq!(dfs.path().first(), Some(&maze.start()));
        assert_eq!(dfs.path().last(), Some(&maze.end()));
    }
}

#[test]
fn render_is_idempotent() {
    let maze = generate(13, 13, Some(4)).unwrap();
    let outcome = solve_bfs(&maze);
    let first = render(maze.cells(), Some(outcome.path()));
    let second = render(maze.cells(), Some(outcome.path()));
    assert_eq!(first, second);
    assert_eq!(render_text(&first), render_text(&second));
}

#[test]
fn render_then_load_preserves_classification() {
    for seed in 0..20 {
        let maze = generate(11, 15, Some(seed)).unwrap();
        let reloaded = Maze::from_rows(render(maze.cells(), None)).unwrap();
        assert_eq!(classification(&reloaded), classification(&maze));
        assert_eq!(reloaded.start(), maze.start());
        assert_eq!(reloaded.end(), maze.end());

        let text = maze.to_string();
        assert_eq!(Maze::parse(&text).unwrap(), maze);
    }
}

#[test]
fn rendered_solution_loads_back_as_the_same_maze() {
    let maze = generate(11, 15, Some(8)).unwrap();
    let outcome = solve_dfs(&maze);
    let reloaded = Maze::parse(&render_text(&maze.render(Some(outcome.path())))).unwrap();
    assert_eq!(reloaded, maze);
}

#[test]
fn smallest_maze_has_coincident_endpoints() {
    for seed in 0..10 {
        let maze = generate(3, 3, Some(seed)).unwrap();
        assert_eq!(maze.start(), Position::new(1, 1));
        assert_eq!(maze.end(), Position::new(1, 1));
        // the end marker is placed last and shares the cell
        assert_eq!(maze.cell(Position::new(1, 1)), Some(Cell::End));
        assert_eq!(maze.passable_count(), 1);
        for strategy in Strategy::ALL {
            let outcome = strategy.solve(&maze);
            assert!(outcome.found());
            assert_eq!(outcome.path(), &[Position::new(1, 1)]);
        }
    }
}

#[test]
fn scatter_style_honours_the_same_guarantees() {
    let config = GeneratorConfig {
        style: GenerationStyle::Scatter,
        ..GeneratorConfig::default()
    };
    for seed in 0..50 {
        let mut generator = MazeGenerator::new(StdRng::seed_from_u64(seed), config.clone()).unwrap();
        let maze = generator.generate(14, 9).unwrap();
        assert!(solve_bfs(&maze).found());
        assert!(solve_dfs(&maze).found());
    }
}

#[test]
fn one_maze_can_be_solved_from_several_threads() {
    let maze = generate(31, 31, Some(12)).unwrap();
    let expected = solve_bfs(&maze).into_path();
    let shared = &maze;
    std::thread::scope(|scope| {
        let handles: Vec<_> = Strategy::ALL
            .into_iter()
            .map(|strategy| scope.spawn(move || strategy.solve(shared)))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().found());
        }
    });
    assert_eq!(solve_bfs(&maze).into_path(), expected);
}
