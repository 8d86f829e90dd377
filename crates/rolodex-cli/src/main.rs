#![forbid(unsafe_code)]

mod cmd;
mod output;
mod store;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::Session;
use output::{CliError, OutputMode, render_error};
use rolodex_core::ErrorCode;
use rolodex_core::config::resolve_config;
use std::env;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rdx: multi-tenant contact directory with duplicate reconciliation",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `--json`, `FORMAT` and user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Tenant whose contacts to operate on.
    #[arg(long, global = true, env = "ROLODEX_TENANT")]
    tenant: Option<String>,

    /// Operator name recorded on audit events.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a tenant store",
        after_help = "EXAMPLES:\n    rdx --tenant acme init"
    )]
    Init(cmd::init::InitArgs),

    #[command(next_help_heading = "Setup", about = "Import contacts from a JSON file")]
    Import(cmd::import::ImportArgs),

    #[command(next_help_heading = "Review", about = "List groups of likely duplicates")]
    Dups(cmd::dups::DupsArgs),

    #[command(
        next_help_heading = "Review",
        about = "Show field and tag differences between two contacts",
        after_help = "EXAMPLES:\n    rdx --tenant acme diff c-1 c-2"
    )]
    Diff(cmd::diff::DiffArgs),

    #[command(
        next_help_heading = "Reconcile",
        about = "Merge a source contact into a target"
    )]
    Merge(cmd::merge::MergeArgs),

    #[command(
        next_help_heading = "Review",
        about = "Show the audit trail of a contact",
        after_help = "EXAMPLES:\n    rdx --tenant acme log c-1\n\n    rdx --tenant acme log c-1 -n 5 --json"
    )]
    Log(cmd::log::LogArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    rdx completions bash\n\n    rdx completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Cli {
    /// Operator identity: `--user` > `ROLODEX_USER` > user config > `USER`.
    fn actor(&self, configured: Option<&str>) -> String {
        self.user
            .clone()
            .or_else(|| env::var("ROLODEX_USER").ok())
            .or_else(|| configured.map(str::to_string))
            .or_else(|| env::var("USER").ok())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ROLODEX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "rolodex=debug,rdx=debug,info"
        } else {
            "rolodex=info,rdx=info,warn"
        })
    });

    let format = env::var("ROLODEX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

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

fn run(cli: &Cli, session: &Session<'_>) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, session),
        Commands::Import(args) => cmd::import::run_import(args, session),
        Commands::Dups(args) => cmd::dups::run_dups(args, session),
        Commands::Diff(args) => cmd::diff::run_diff(args, session),
        Commands::Merge(args) => cmd::merge::run_merge(args, session),
        Commands::Log(args) => cmd::log::run_log(args, session),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let fallback_mode = cli
        .format
        .unwrap_or(if cli.json { OutputMode::Json } else { OutputMode::Text });

    let project_root = match env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            let _ = render_error(
                fallback_mode,
                &CliError::coded(
                    format!("cannot read working directory: {err}"),
                    ErrorCode::InternalUnexpected,
                ),
            );
            return ExitCode::FAILURE;
        }
    };

    let config = match resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(err) => {
            let _ = render_error(
                fallback_mode,
                &CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
            );
            return ExitCode::FAILURE;
        }
    };

    let output = cli
        .format
        .unwrap_or_else(|| OutputMode::from_resolved(&config.resolved_output));
    let actor = cli.actor(config.user.user.as_deref());
    debug!(?output, actor = %actor, "resolved session");

    let session = Session {
        project_root: &project_root,
        output,
        config: &config,
        tenant: cli.tenant.as_deref(),
        actor: &actor,
    };

    match run(&cli, &session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = render_error(output, &CliError::from_anyhow(&err));
            ExitCode::FAILURE
        }
    }
}
