use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use histogrid_common::Grid;
use histogrid_filter::{FilterConfig, Kernel, blur_steps};
use histogrid_map::Map;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "histogrid-cli", about = "CLI tool for histogram filter grids")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with filter defaults (blurring, steps, precision)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the kernel weights for the configured blur factor
    Info,
    /// Load a map file and print it with its dimensions
    Map {
        /// Path to the map file
        path: PathBuf,
    },
    /// Blur a starting belief over a toroidal world
    Blur {
        /// Take the world shape from a map file and start from its uniform prior
        #[arg(short, long)]
        map: Option<PathBuf>,
        /// World height when no map is given
        #[arg(long, default_value = "5")]
        rows: usize,
        /// World width when no map is given
        #[arg(long, default_value = "5")]
        cols: usize,
        /// Start from all mass at ROW,COL (defaults to the centre without a map)
        #[arg(long, value_parser = parse_cell)]
        at: Option<(usize, usize)>,
        /// Blur factor in [0, 1]
        #[arg(short, long)]
        blurring: Option<f64>,
        /// Number of blur steps
        #[arg(short, long)]
        steps: Option<usize>,
        /// Decimal places to print
        #[arg(short, long)]
        precision: Option<usize>,
        /// Print the grid as JSON rows
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => FilterConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => FilterConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("histogrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("filter: {}", histogrid_filter::crate_info());
            let kernel = Kernel::new(config.blurring);
            println!(
                "kernel: blurring={} center={:.4} adjacent={:.4} corner={:.4} total={:.4}",
                config.blurring,
                kernel.center(),
                kernel.adjacent(),
                kernel.corner(),
                kernel.total()
            );
        }
        Commands::Map { path } => {
            let map = Map::load(&path).with_context(|| format!("loading map {}", path.display()))?;
            println!("Map: {}x{}", map.rows(), map.cols());
            println!("{map}");
            for (code, count) in map.categories() {
                println!("  {code}: {count}");
            }
        }
        Commands::Blur {
            map,
            rows,
            cols,
            at,
            blurring,
            steps,
            precision,
            json,
        } => {
            let blurring = blurring.unwrap_or(config.blurring);
            let steps = steps.unwrap_or(config.steps);
            let precision = precision.unwrap_or(config.precision);

            let map = map
                .map(|path| {
                    Map::load(&path).with_context(|| format!("loading map {}", path.display()))
                })
                .transpose()?;
            let start = start_grid(map.as_ref(), rows, cols, at)?;
            tracing::debug!(
                rows = start.rows(),
                cols = start.cols(),
                blurring,
                steps,
                "blurring grid"
            );

            let result = blur_steps(&start, blurring, steps).context("blur failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Blur: {}x{}, blurring={blurring}, steps={steps}",
                    result.rows(),
                    result.cols()
                );
                println!("{result:.precision$}");
            }
        }
    }

    Ok(())
}

/// Build the starting belief: an impulse when a cell is given, otherwise the
/// map's uniform prior or an impulse at the centre of a `rows` x `cols` world.
fn start_grid(
    map: Option<&Map>,
    rows: usize,
    cols: usize,
    at: Option<(usize, usize)>,
) -> anyhow::Result<Grid> {
    let (rows, cols) = map.map_or((rows, cols), |m| (m.rows(), m.cols()));
    let grid = match (map, at) {
        (_, Some((r, c))) => Grid::impulse(rows, cols, r, c)?,
        (Some(m), None) => m.uniform_prior()?,
        (None, None) => Grid::impulse(rows, cols, rows / 2, cols / 2)?,
    };
    Ok(grid)
}

fn parse_cell(s: &str) -> Result<(usize, usize), String> {
    let (r, c) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid index `{v}`: {e}"))
    };
    Ok((parse(r)?, parse(c)?))
}
