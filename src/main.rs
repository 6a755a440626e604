use docopt::Docopt;
use serde_derive::Deserialize;
use mazes::{
    grid::Grid,
    grid_displays::{self, PlainDisplay},
    options::{Algorithm, MazeOptions, MazeOptionsBuilder, Mode},
};
use std::{
    io,
    io::prelude::*,
    fs::File,
    thread,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Mazes

Usage:
    mazes_driver -h | --help
    mazes_driver (animate|generate|solve) (backtrack|kruskal|prim) [--rows=<r>] [--columns=<c>] [--step-interval=<ms>] [--seed=<n>] [--text-out=<path>]

Options:
    -h --help               Show this screen.
    --rows=<r>              Number of rows in the maze [default: 12].
    --columns=<c>           Number of columns in the maze [default: 10].
    --step-interval=<ms>    Milliseconds between animation frames [default: 100].
    --seed=<n>              Seed the random number generator for a repeatable maze.
    --text-out=<path>       Also write a plain textual rendering of the finished maze to a file.

Logging goes to stderr and is controlled with RUST_LOG, e.g. RUST_LOG=mazes=trace.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_animate: bool,
    cmd_generate: bool,
    cmd_solve: bool,
    cmd_backtrack: bool,
    cmd_kruskal: bool,
    cmd_prim: bool,
    flag_rows: usize,
    flag_columns: usize,
    flag_step_interval: u64,
    flag_seed: Option<u64>,
    flag_text_out: String,
}

mod errors {
    use error_chain::*;
    error_chain! {
        links {
            Maze(::mazes::errors::Error, ::mazes::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mazes=info,mazes_driver=info")))
        .with_writer(io::stderr)
        .compact()
        .init();

    let args: MazeArgs = match Docopt::new(USAGE).and_then(|d| d.deserialize()) {
        Ok(args) => args,
        Err(e) if e.fatal() => return Err(e.into()),
        Err(e) => e.exit(),
    };

    let options = maze_options_from_args(&args);
    info!(rows = options.rows().0,
          columns = options.columns().0,
          algorithm = ?options.algorithm(),
          mode = ?options.mode(),
          "mazes driver starting");

    let mut maze_grid = Grid::new(options)
        .chain_err(|| "Failed to create the maze grid")?;

    match options.mode() {
        Mode::Animate => {
            animate_maze(&mut maze_grid);
            report_solution(&mut maze_grid);
        }
        Mode::Generate => {
            maze_grid.generate();
            println!("{}", maze_grid);
            report_solution(&mut maze_grid);
        }
        Mode::Solve => {
            maze_grid.generate();
            maze_grid.solve();
            println!("{}", maze_grid);
        }
    }

    if !args.flag_text_out.is_empty() {
        write_text_to_file(&grid_displays::render_grid(&maze_grid, &PlainDisplay),
                           &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn maze_options_from_args(maze_args: &MazeArgs) -> MazeOptions {
    let algorithm = if maze_args.cmd_kruskal {
        Algorithm::Kruskal
    } else if maze_args.cmd_prim {
        Algorithm::Prim
    } else {
        Algorithm::Backtrack
    };
    let mode = if maze_args.cmd_generate {
        Mode::Generate
    } else if maze_args.cmd_solve {
        Mode::Solve
    } else {
        Mode::Animate
    };

    MazeOptionsBuilder::new()
        .rows(maze_args.flag_rows)
        .columns(maze_args.flag_columns)
        .step_interval(maze_args.flag_step_interval)
        .algorithm(algorithm)
        .mode(mode)
        .seed(maze_args.flag_seed)
        .build()
}

/// Step the maze generation, drawing every frame and pausing between them.
fn animate_maze(maze_grid: &mut Grid) {
    let pause = maze_grid.options().step_duration();
    let mut animation = maze_grid.animate();

    while let Some(remaining) = animation.next() {
        println!("{}", animation.grid());
        println!("remaining: {}", remaining);
        if remaining > 0 {
            thread::sleep(pause);
        }
    }
    debug!(steps = animation.steps(), "animation complete");
}

fn report_solution(maze_grid: &mut Grid) {
    let steps = maze_grid.solve();
    if steps > 0 {
        println!("{}", maze_grid);
        println!("solved in {} steps", steps);
    } else {
        println!("no solution");
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
