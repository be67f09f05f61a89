use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for histogrid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run the blur/normalize timing benchmarks
    Bench,
}

/// A cargo invocation with the label printed before it runs.
struct Task {
    label: &'static str,
    args: &'static [&'static str],
}

const FMT: Task = Task {
    label: "cargo fmt --check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Task = Task {
    label: "cargo clippy",
    args: &[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ],
};
const TEST: Task = Task {
    label: "cargo test",
    args: &["test", "--workspace"],
};
const DOC: Task = Task {
    label: "cargo doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BUILD: Task = Task {
    label: "cargo build",
    args: &["build", "--workspace"],
};
const BENCH: Task = Task {
    label: "cargo bench",
    args: &["bench", "-p", "histogrid-filter"],
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tasks: Vec<Task> = match cli.command {
        Commands::Check => vec![FMT, CLIPPY, TEST, DOC],
        Commands::Fmt => vec![FMT],
        Commands::Clippy => vec![CLIPPY],
        Commands::Test => vec![TEST],
        Commands::Doc => vec![DOC],
        Commands::Build => vec![BUILD],
        Commands::Bench => vec![BENCH],
    };
    tasks.iter().try_for_each(run)
}

fn run(task: &Task) -> Result<()> {
    println!("==> Running {}", task.label);
    let status = Command::new("cargo").args(task.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed", task.label);
    }
    Ok(())
}
