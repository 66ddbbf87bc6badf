//! EnvDeck CLI
//!
//! Manage named groups of environment variables and hosts entries and keep
//! them in sync with the shell startup script and the hosts file.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "envdeck", &mut std::io::stdout());
            Ok(())
        }
        Some(cmd) => {
            let mut ctx = Context::load(cli.data_dir.as_deref())?;
            execute_command(&mut ctx, cmd)
        }
        None => {
            println!("{} Environment and hosts groups", "envdeck".green().bold());
            println!();
            println!("Run {} for available commands.", "envdeck --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(ctx: &mut Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status { json } => commands::run_status(ctx, json),
        Commands::Sync {
            shell,
            hosts,
            dry_run,
        } => commands::run_sync(ctx, shell, hosts, dry_run),
        Commands::Diff { hosts } => commands::run_diff(ctx, hosts),
        Commands::Conflicts { hosts, json } => commands::run_conflicts(ctx, hosts, json),
        Commands::Scan { hosts, json } => commands::run_scan(ctx, hosts, json),
        Commands::Migrate { line, group, hosts } => {
            commands::run_migrate(ctx, line, &group, hosts)
        }
        Commands::RemoveLine { line, hosts } => commands::run_remove_line(ctx, line, hosts),
        Commands::Group { action } => commands::run_group(ctx, action),
        Commands::Var { action } => commands::run_var(ctx, action),
        Commands::Host { action } => commands::run_host(ctx, action),
        Commands::Backup { action } => commands::run_backup(ctx, action),
        Commands::Export {
            format,
            hosts,
            group,
            include_disabled,
            output,
        } => commands::run_export(
            ctx,
            format,
            hosts,
            group.as_deref(),
            include_disabled,
            output.as_deref(),
        ),
        Commands::Import {
            file,
            format,
            hosts,
            name,
        } => commands::run_import(ctx, &file, format, hosts, &name),
        Commands::Completions { .. } => Ok(()),
    }
}
