use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

/// Host runtime with the built-in extensions and any shared-library ones.
///
/// Loads every built-in extension and each `--require` library, then calls or
/// lists the functions they registered.
///
/// EXAMPLES:
///     host call Foo return_3        Call Foo.return_3 with no arguments
///     host list                     List registered functions
///     host -r ./bar.so list         Also load the shared library bar.so
///
/// ENVIRONMENT VARIABLES:
///     HOST_REDEFINITION  'reject' or 'replace' duplicate registrations
///     HOST_VERBOSE       Set to '1' to warn when a function is replaced
///     HOST_LOG           Default for --log-level
///     RUST_LOG           Log filter, overrides --log-level
#[derive(Parser)]
#[command(name = "host")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (default: host.toml in the current directory or a parent)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Shared library extension to load after the built-in ones (repeatable)
    #[arg(long = "require", short = 'r', global = true, value_name = "PATH")]
    require: Vec<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn", env = "HOST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a registered function
    ///
    /// EXAMPLES:
    ///     host call Foo return_3
    Call {
        /// Module name
        module: String,
        /// Function name
        function: String,
        /// Integer arguments
        #[arg(allow_negative_numbers = true)]
        args: Vec<i64>,
    },

    /// List loaded modules and their functions
    #[command(visible_alias = "ls")]
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let config = commands::load_config(cli.config.as_deref())?;
    let runtime = commands::boot(&config, &cli.require)?;

    match cli.command {
        Commands::Call {
            module,
            function,
            args,
        } => commands::call::run(&runtime, &module, &function, &args),
        Commands::List => commands::list::run(&runtime),
    }
}
