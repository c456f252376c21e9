use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use maze_core::{
    GenerationStyle, GeneratorConfig, Maze, MazeGenerator, SolveOutcome, Strategy, render_text,
};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Parser, Debug)]
#[command(version, about = "Generate and solve grid mazes", long_about = None)]
struct Args {
    /// Log generation and solve details (MAZE_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a maze and print it in the text format
    Generate {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Write the maze to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Solve a maze file, or a freshly generated maze when no file is given
    Solve {
        /// Maze file to load
        #[arg(short, long, value_name = "MAZE_FILE")]
        maze: Option<PathBuf>,

        #[command(flatten)]
        shape: ShapeArgs,

        #[arg(short, long, value_enum, default_value_t = StrategyArg::Both)]
        strategy: StrategyArg,

        /// Print the outcomes as JSON instead of drawing the solution
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ShapeArgs {
    #[arg(long, default_value_t = 21)]
    rows: usize,

    #[arg(long, default_value_t = 21)]
    cols: usize,

    /// Seed for a reproducible maze
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = StyleArg::Backtracking)]
    style: StyleArg,

    /// Skip the complexity phase and keep the perfect maze
    #[arg(long)]
    simple: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StyleArg {
    Backtracking,
    Scatter,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StrategyArg {
    Dfs,
    Bfs,
    Both,
}

impl StrategyArg {
    fn strategies(self) -> &'static [Strategy] {
        match self {
            StrategyArg::Dfs => &[Strategy::DepthFirst],
            StrategyArg::Bfs => &[Strategy::BreadthFirst],
            StrategyArg::Both => &Strategy::ALL,
        }
    }
}

impl ShapeArgs {
    fn config(&self) -> GeneratorConfig {
        let style = match self.style {
            StyleArg::Backtracking => GenerationStyle::Backtracking,
            StyleArg::Scatter => GenerationStyle::Scatter,
        };
        GeneratorConfig {
            style,
            complexity: !self.simple,
            ..GeneratorConfig::default()
        }
    }

    fn generate(&self) -> Result<Maze> {
        let maze = MazeGenerator::seeded(self.seed, self.config())?
            .generate(self.rows, self.cols)
            .with_context(|| format!("Failed to generate a {}x{} maze", self.rows, self.cols))?;
        debug!("Generated {}x{} maze ({:?} style)", self.rows, self.cols, self.style);
        Ok(maze)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args, &mut out)
}

/// Installs `env_logger`, filtered by `MAZE_LOG` and styled by `MAZE_LOG_STYLE`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::new()
        .filter_or("MAZE_LOG", default_filter)
        .write_style("MAZE_LOG_STYLE");
    env_logger::init_from_env(env);
}

fn run(args: Args, out: &mut impl Write) -> Result<()> {
    match args.command {
        Command::Generate { shape, output } => {
            let maze = shape.generate()?;
            match output {
                Some(path) => {
                    fs::write(&path, maze.to_string())
                        .with_context(|| format!("Failed to write maze file {}", path.display()))?;
                    debug!("Wrote maze to {}", path.display());
                }
                None => write!(out, "{maze}")?,
            }
        }
        Command::Solve {
            maze,
            shape,
            strategy,
            json,
        } => {
            let maze = match maze {
                Some(path) => load_maze(&path)?,
                None => shape.generate()?,
            };
            let outcomes: Vec<SolveOutcome> = strategy
                .strategies()
                .iter()
                .map(|strategy| strategy.solve(&maze))
                .collect();

            if json {
                serde_json::to_writer_pretty(&mut *out, &outcomes)?;
                writeln!(out)?;
            } else {
                write!(out, "{maze}")?;
                for outcome in &outcomes {
                    writeln!(out)?;
                    print_outcome(out, &maze, outcome)?;
                }
            }
        }
    }
    Ok(())
}

fn load_maze(path: &Path) -> Result<Maze> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read maze file {}", path.display()))?;
    let maze = Maze::parse(&text)
        .with_context(|| format!("Failed to load maze from {}", path.display()))?;
    debug!(
        "Loaded {}x{} maze from {} with start {} and end {}",
        maze.rows(),
        maze.cols(),
        path.display(),
        maze.start(),
        maze.end()
    );
    Ok(maze)
}

/// Prints a solve summary followed by the maze with the route drawn in.
fn print_outcome(out: &mut impl Write, maze: &Maze, outcome: &SolveOutcome) -> Result<()> {
    writeln!(
        out,
        "{}: {} cells visited, {:.3} ms",
        outcome.strategy(),
        outcome.visited(),
        outcome.elapsed_ms()
    )?;
    if !outcome.found() {
        writeln!(out, "{}: no path found", outcome.strategy())?;
        return Ok(());
    }
    writeln!(out, "Path length (S to E): {} cells", outcome.path_len())?;
    writeln!(out, "Solution:")?;
    write!(out, "{}", render_text(&maze.render(Some(outcome.path()))))?;
    Ok(())
}
