#![forbid(unsafe_code)]

mod actor;
mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trellis_core::ErrorCode;
use trellis_core::config;
use trellis_core::model::UserId;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "trellis: tasks in a cycle-free hierarchy",
    long_about = None
)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user id (skips env and config resolution).
    #[arg(long = "as", value_name = "USER_ID", global = true)]
    actor: Option<UserId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a trellis project",
        long_about = "Initialize a trellis project in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    tl init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Register or show users",
        after_help = "EXAMPLES:\n    # Register the first admin\n    tl user add alice --role admin\n\n    # Show a user\n    tl user show 1"
    )]
    User(cmd::user::UserArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Create a top-level task",
        after_help = "EXAMPLES:\n    tl create --title \"Ship v1\" --due 2026-03-01 --assign 2"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Create a task linked under a parent",
        long_about = "Create a task and link it under PARENT in one step. Without --assign the \
                      subtask copies the parent's current assignees.",
        after_help = "EXAMPLES:\n    tl subtask 1 --title \"Write docs\""
    )]
    Subtask(cmd::subtask::SubtaskArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Show a task with its parents and children"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Set a task's status",
        long_about = "Set a task's status. Completing a task completes every ancestor whose \
                      children are then all completed.",
        after_help = "EXAMPLES:\n    tl status 4 in_progress\n    tl status 4 done"
    )]
    Status(cmd::status::StatusArgs),

    #[command(next_help_heading = "Tasks", about = "Replace a task's assignees")]
    Assign(cmd::assign::AssignArgs),

    #[command(next_help_heading = "Tasks", about = "Delete a task and its links")]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Link CHILD under PARENT",
        long_about = "Link CHILD under PARENT. Links that would close a cycle are rejected \
                      with the offending path.",
        after_help = "EXAMPLES:\n    tl link 1 4"
    )]
    Link(cmd::link::EdgeArgs),

    #[command(next_help_heading = "Hierarchy", about = "Remove the link between PARENT and CHILD")]
    Unlink(cmd::link::EdgeArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Check the hierarchy for cycles and dangling links"
    )]
    Verify(cmd::verify::VerifyArgs),

    #[command(next_help_heading = "Reporting", about = "Count tasks by status")]
    Stats(cmd::stats::StatsArgs),
}

impl Cli {
    /// Output mode after applying `FORMAT` and the user config.
    fn output_mode(&self, project_root: &Path) -> anyhow::Result<OutputMode> {
        match config::resolve_config(project_root, self.json) {
            Ok(effective) => Ok(OutputMode::from_resolved(&effective.resolved_output)),
            Err(e) => {
                let mode = if self.json {
                    OutputMode::Json
                } else {
                    OutputMode::Text
                };
                render_error(
                    mode,
                    &CliError::from_code(ErrorCode::ConfigParseError, format!("{e:#}")),
                )?;
                Err(e)
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "trellis=debug,info"
        } else {
            "trellis=info,warn"
        })
    });

    let format = env::var("TRELLIS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let project_root = env::current_dir()?;

    if let Commands::Init(args) = &cli.command {
        return cmd::init::run_init(args, &project_root);
    }

    let output = cli.output_mode(&project_root)?;
    debug!(?output, root = %project_root.display(), "resolved output mode");

    match &cli.command {
        Commands::Init(_) => Ok(()),
        Commands::User(args) => cmd::user::run_user(args, output, &project_root),
        Commands::Create(args) => cmd::create::run_create(args, cli.actor, output, &project_root),
        Commands::Subtask(args) => {
            cmd::subtask::run_subtask(args, cli.actor, output, &project_root)
        }
        Commands::Show(args) => cmd::show::run_show(args, output, &project_root),
        Commands::Status(args) => cmd::status::run_status(args, cli.actor, output, &project_root),
        Commands::Assign(args) => cmd::assign::run_assign(args, cli.actor, output, &project_root),
        Commands::Delete(args) => cmd::delete::run_delete(args, cli.actor, output, &project_root),
        Commands::Link(args) => cmd::link::run_link(args, cli.actor, output, &project_root),
        Commands::Unlink(args) => cmd::link::run_unlink(args, cli.actor, output, &project_root),
        Commands::Verify(args) => cmd::verify::run_verify(args, output, &project_root),
        Commands::Stats(args) => cmd::stats::run_stats(args, output, &project_root),
    }
}
