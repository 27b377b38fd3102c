//! Command dispatch

use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::db::{pending_migrations, run_pending_migrations};
use crate::error::AppResult;
use crate::server::Server;

/// Run the parsed command to completion.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.command() {
        Commands::Serve { dry_run: true, .. } => dry_run_serve(&settings),
        Commands::Serve { .. } => Server::new(settings).run().await,
        Commands::Migrate { dry_run } => migrate(&settings, dry_run).await,
    }
}

fn dry_run_serve(settings: &Settings) -> AppResult<()> {
    settings.validate()?;

    println!("✓ Configuration is valid");
    println!("✓ Server would bind to: {}", settings.server.address());
    println!(
        "✓ Graceful shutdown timeout: {}s",
        settings.server.shutdown_timeout
    );
    println!("Dry run completed successfully");
    Ok(())
}

async fn migrate(settings: &Settings, dry_run: bool) -> AppResult<()> {
    settings.database.validate()?;

    if dry_run {
        let pending = pending_migrations(&settings.database.url).await?;
        if pending.is_empty() {
            println!("✓ No pending migrations found - database is up to date");
        } else {
            println!("Found {} pending migration(s):", pending.len());
            for name in &pending {
                println!("  - {}", name);
            }
            println!("\nRun without --dry-run to apply these migrations");
        }
        return Ok(());
    }

    let applied = run_pending_migrations(&settings.database.url).await?;
    if applied.is_empty() {
        println!("✓ No migrations to apply - database is already up to date");
    } else {
        println!("✓ Applied {} migration(s):", applied.len());
        for name in &applied {
            println!("  - {}", name);
        }
    }
    tracing::info!(applied = applied.len(), "Database migration completed");
    Ok(())
}
