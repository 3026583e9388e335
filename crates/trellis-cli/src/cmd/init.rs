use anyhow::{Context as _, Result};
use clap::Args;
use std::path::Path;
use trellis_core::HierarchyService;
use trellis_core::config::PROJECT_DIR;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config even if `.trellis/` already exists. The store is
    /// kept.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[hierarchy]\n\
    # Re-linking an existing parent/child pair fails instead of returning it.\n\
    strict_edges = false\n\
    # Complete a parent once all of its children are completed.\n\
    auto_complete = true\n\
    \n\
    [store]\n\
    busy_timeout_ms = 5000\n";

const GITIGNORE: &str = "trellis.sqlite3\ntrellis.sqlite3-wal\ntrellis.sqlite3-shm\n";

/// Execute `tl init`. Creates the project skeleton:
///
/// ```text
/// .trellis/
///   config.toml       (default project config)
///   .gitignore        (the store and its WAL files)
///   trellis.sqlite3   (migrated store)
/// ```
///
/// # Errors
///
/// Returns an error if `.trellis/` already exists and `--force` is not set,
/// or if any filesystem or store operation fails.
pub fn run_init(args: &InitArgs, project_root: &Path) -> Result<()> {
    let project_dir = project_root.join(PROJECT_DIR);

    if project_dir.exists() && !args.force {
        anyhow::bail!("{PROJECT_DIR}/ already exists. Use `tl init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&project_dir)
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;

    let config_path = project_dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = project_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    HierarchyService::open(project_root).context("Failed to create task store")?;

    println!("✓ Initialized {PROJECT_DIR}/ project structure.");
    println!();
    println!("  Config: {PROJECT_DIR}/config.toml");
    println!();
    println!("Next steps:");
    println!("  Register a user and act as them:");
    println!("    tl user add alice --role admin");
    println!("    export TRELLIS_ACTOR=1");
    println!();
    println!("  Create and link tasks:");
    println!("    tl create --title \"Ship v1\"");
    println!("    tl subtask 1 --title \"Write docs\"");

    Ok(())
}
