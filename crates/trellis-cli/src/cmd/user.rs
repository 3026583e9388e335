//! `tl user`: register and inspect users.

use std::path::Path;

use clap::{Args, Subcommand};
use trellis_core::model::{User, UserId, UserRole};

use crate::cmd::{fail, open_service};
use crate::output::{OutputMode, format_us, render, text_kv};

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a new user.
    Add {
        /// Unique username.
        username: String,

        /// Display name.
        #[arg(long)]
        full_name: Option<String>,

        /// Role: admin, manager, or user.
        #[arg(long, default_value = "user")]
        role: UserRole,
    },

    /// Show one user.
    Show {
        /// User id.
        id: UserId,
    },
}

/// Execute `tl user`. Registration needs no acting user so that the first
/// account can be created.
pub fn run_user(args: &UserArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut svc = open_service(project_root, output)?;

    let user = match &args.command {
        UserCommand::Add {
            username,
            full_name,
            role,
        } => svc
            .create_user(username, full_name.as_deref(), *role)
            .map_err(|e| fail(output, e))?,
        UserCommand::Show { id } => svc.get_user(*id).map_err(|e| fail(output, e))?,
    };

    render(output, &user, render_user)?;
    Ok(())
}

fn render_user(user: &User, w: &mut dyn std::io::Write) -> std::io::Result<()> {
    text_kv(w, "ID", user.id.to_string())?;
    text_kv(w, "Username", &user.username)?;
    if let Some(full_name) = &user.full_name {
        text_kv(w, "Name", full_name)?;
    }
    text_kv(w, "Role", user.role.as_str())?;
    text_kv(w, "Created", format_us(user.created_at_us))
}
