#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use whizzy_core::WhizzyError;
use whizzy_core::config::{self, UserConfig};
use whizzy_core::store::SqliteBackend;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wz: household chores for shared homes",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the data file. Overrides WHIZZY_DB and the config file.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Account",
        about = "Create an account",
        long_about = "Create an account and sign in. Profile setup comes next.",
        after_help = "EXAMPLES:\n    # Register\n    wz signup --email ana@example.com --password secret1\n\n    # Emit machine-readable output\n    wz signup --email ana@example.com --password secret1 --json"
    )]
    Signup(cmd::auth::CredentialsArgs),

    #[command(
        next_help_heading = "Account",
        about = "Sign in",
        long_about = "Sign in and resume onboarding where it was left.",
        after_help = "EXAMPLES:\n    # Sign in\n    wz login --email ana@example.com --password secret1"
    )]
    Login(cmd::auth::CredentialsArgs),

    #[command(
        next_help_heading = "Account",
        about = "Sign out",
        after_help = "EXAMPLES:\n    # Sign out\n    wz logout"
    )]
    Logout,

    #[command(
        next_help_heading = "Account",
        about = "Show who is signed in and the next step",
        after_help = "EXAMPLES:\n    # Where am I?\n    wz status\n\n    # Emit machine-readable output\n    wz status --json"
    )]
    Status,

    #[command(
        next_help_heading = "Onboarding",
        about = "Profile setup and overview",
        subcommand
    )]
    Profile(cmd::profile::ProfileCommand),

    #[command(
        next_help_heading = "Onboarding",
        about = "Create, join and manage groups",
        subcommand
    )]
    Group(cmd::group::GroupCommand),

    #[command(
        next_help_heading = "Onboarding",
        about = "Browse the catalog and schedule chores",
        subcommand
    )]
    Tasks(cmd::tasks::TasksCommand),

    #[command(
        next_help_heading = "Home",
        about = "Show chores for a day",
        long_about = "Show the current group's chores for one day of the week.",
        after_help = "EXAMPLES:\n    # Chores on the group's first day\n    wz week\n\n    # Another day, with one chore marked done\n    wz week --day Martes --done 7"
    )]
    Week(cmd::week::WeekArgs),

    #[command(
        next_help_heading = "Home",
        about = "Show the group's points ranking",
        after_help = "EXAMPLES:\n    # Ranking\n    wz ranking\n\n    # Emit machine-readable output\n    wz ranking --json"
    )]
    Ranking,

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    wz completions bash > ~/.local/share/bash-completion/completions/wz"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("WHIZZY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "whizzy=debug,wz=debug,info"
        } else {
            "whizzy=info,wz=info,warn"
        })
    });

    let format = env::var("WHIZZY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn open_backend(cli: &Cli, config: &UserConfig) -> anyhow::Result<SqliteBackend> {
    let env_path = env::var(config::STORE_PATH_ENV).ok();
    let path = config::resolve_store_path(cli.db.as_deref(), env_path.as_deref(), config)
        .ok_or_else(|| {
            WhizzyError::Config(format!(
                "no data directory found; pass --db or set {}",
                config::STORE_PATH_ENV
            ))
        })?;
    debug!(path = %path.display(), "opening store");
    Ok(SqliteBackend::open(&path)?)
}

fn run(cli: &Cli, config: &UserConfig, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let backend = open_backend(cli, config)?;
    let ctx = cmd::Context {
        backend: &backend,
        output,
    };

    match &cli.command {
        Commands::Signup(args) => cmd::auth::run_signup(args, &ctx),
        Commands::Login(args) => cmd::auth::run_login(args, &ctx),
        Commands::Logout => cmd::auth::run_logout(&ctx),
        Commands::Status => cmd::auth::run_status(&ctx),
        Commands::Profile(command) => cmd::profile::run(command, &ctx),
        Commands::Group(command) => cmd::group::run(command, &ctx),
        Commands::Tasks(command) => cmd::tasks::run(command, &ctx),
        Commands::Week(args) => cmd::week::run(args, &ctx),
        Commands::Ranking => cmd::ranking::run(&ctx),
        Commands::Completions(_) => Ok(()),
    }
}

fn report(mode: OutputMode, err: &anyhow::Error) {
    debug!(error = %format!("{err:#}"), "command failed");
    if let Err(render_err) = output::render_error(mode, &CliError::from(err)) {
        eprintln!("error: {err:#} ({render_err})");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match config::load_user_config() {
        Ok(config) => config,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.format, cli.json, None);
            report(mode, &err.into());
            return ExitCode::FAILURE;
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, config.output.as_deref());

    match run(&cli, &config, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(output, &err);
            ExitCode::FAILURE
        }
    }
}
