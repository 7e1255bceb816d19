//! ratlisp CLI
//!
//! Main entry point for the `ratlisp` command.

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ratlisp::interp::{render_with, symbol_count};
use ratlisp::parser::Reader;
use ratlisp::repl::{Repl, run_file};
use ratlisp::{Config, Interpreter, MAX_EVAL_DEPTH};

#[derive(Parser)]
#[command(name = "ratlisp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A small Lisp over integers, floats and exact rationals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ./ratlisp.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Skip loading the Lisp prelude
    #[arg(long, global = true)]
    no_prelude: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a Lisp source file
    Run {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Start the REPL after the file has run
        #[arg(short, long)]
        interactive: bool,
    },

    /// Evaluate an expression and print each result
    Eval {
        /// Source text
        #[arg(value_name = "EXPR")]
        expr: String,
    },

    /// Start the interactive REPL
    Repl,

    /// Show information about the interpreter
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("ratlisp=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_prelude {
        config.prelude = false;
    }

    // Deep non-tail recursion needs more stack than the main thread has.
    let worker = std::thread::Builder::new()
        .name("ratlisp-eval".to_string())
        .stack_size(config.stack_size())
        .spawn(move || dispatch(cli.command, config))
        .into_diagnostic()?;
    worker
        .join()
        .map_err(|_| miette::miette!("evaluation thread panicked"))?
}

fn dispatch(command: Option<Commands>, config: Config) -> Result<()> {
    match command {
        Some(Commands::Run { input, interactive }) => run(&input, interactive, config),
        Some(Commands::Eval { expr }) => eval(&expr, &config),
        Some(Commands::Repl) | None => repl(config),
        Some(Commands::Info) => info(&config),
    }
}

fn interpreter(config: &Config) -> Result<Interpreter> {
    if config.prelude {
        Ok(Interpreter::new()?)
    } else {
        Ok(Interpreter::bare())
    }
}

fn run(input: &Path, interactive: bool, config: Config) -> Result<()> {
    tracing::info!("Running {:?}", input);

    let interp = interpreter(&config)?;
    run_file(&interp, input)?;

    if interactive {
        Repl::new(interp, config)?.run()?;
    }
    Ok(())
}

fn eval(source: &str, config: &Config) -> Result<()> {
    let interp = interpreter(config)?;
    let options = config.print_options();
    let mut reader = Reader::new("<eval>", source);
    while let Some(expr) = reader.read()? {
        let value = interp.eval(&expr)?;
        println!("{}", render_with(&value, options));
    }
    Ok(())
}

fn repl(config: Config) -> Result<()> {
    let interp = interpreter(&config)?;
    Repl::new(interp, config)?.run()?;
    Ok(())
}

fn info(config: &Config) -> Result<()> {
    let interp = interpreter(config)?;

    println!("ratlisp");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Numbers:");
    println!("  - 32-bit integers, promoted to rationals on overflow");
    println!("  - 64-bit floats");
    println!("  - Exact rationals, demoted to integers when they fit");
    println!();
    println!("Runtime:");
    println!("  Global bindings:  {}", interp.global_env().global_names().len());
    println!("  Interned symbols: {}", symbol_count());
    println!("  Max eval depth:   {}", MAX_EVAL_DEPTH);
    println!();
    println!("Configuration:");
    println!("  prelude:             {}", config.prelude);
    println!("  print_depth:         {}", config.print_depth);
    println!("  annotate_rationals:  {}", config.annotate_rationals);
    match &config.history_file {
        Some(path) => println!("  history_file:        {}", path.display()),
        None => println!("  history_file:        (none)"),
    }
    println!("  stack_size_mib:      {}", config.stack_size_mib);
    Ok(())
}
