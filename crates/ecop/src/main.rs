use clap::{Parser, Subcommand};
use colored::Colorize;
use ecop_compile::CompileError;
use ecop_sch::io::JsonFileError;
use ecop_sch::{CatalogError, SnapshotError};
use env_logger::Env;

mod catalog;
mod compile;
mod config;
mod inputs;
mod validate;

#[derive(Parser)]
#[command(name = "ecop")]
#[command(about = "Compile schematic edit commands into ordered executor actions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and compile a commands file into an actions file
    #[command(alias = "c")]
    Compile(compile::CompileArgs),

    /// Validate a commands file without compiling it
    #[command(alias = "v")]
    Validate(validate::ValidateArgs),

    /// List the parts in a catalog file
    Catalog(catalog::CatalogArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(exit_code(&e));
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG overrides either.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Compile(args) => compile::execute(args),
        Commands::Validate(args) => validate::execute(args),
        Commands::Catalog(args) => catalog::execute(args),
    }
}

/// 1 for problems with the user's inputs, 2 for anything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    let user_error = err.chain().any(|cause| {
        cause.is::<CompileError>()
            || cause.is::<CatalogError>()
            || cause.is::<SnapshotError>()
            || cause.is::<JsonFileError>()
            || cause.is::<config::ConfigError>()
            || cause.is::<validate::ValidationFailed>()
    });
    if user_error { 1 } else { 2 }
}
