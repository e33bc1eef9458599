use clap::{Parser, Subcommand};
use migration::{MigrationError, MigrationRunner};
use tracing::info;

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Database migration tool")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations in filename order
    Up,
    /// Roll back the most recently applied migration
    Down,
    /// Show applied and pending migrations
    Status,
    /// Scaffold a new timestamped migration file
    Create {
        /// Human-readable migration name (whitespace becomes underscores)
        name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,sqlx=warn")
        .init();

    // `create` without a name fails argument parsing here, before any
    // database or filesystem work.
    let args = Args::parse();

    let url = match db_infra::database_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    let migrations_dir = db_infra::migrations_dir();

    let pool = match db_infra::build_admin_pool(&url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let runner = MigrationRunner::new(pool.clone(), migrations_dir);
    let result = run(&runner, args.command).await;

    if let Err(e) = pool.close().await {
        eprintln!("Failed to close database pool: {e}");
    }

    if let Err(e) = result {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}

async fn run(runner: &MigrationRunner, command: Command) -> Result<(), MigrationError> {
    match command {
        Command::Up => {
            info!("Running pending migrations...");
            runner.apply_all().await
        }
        Command::Down => {
            info!("Rolling back last migration...");
            let filename = runner.rollback_last().await?;
            info!("Rolled back: {filename}");
            Ok(())
        }
        Command::Status => show_status(runner).await,
        Command::Create { name } => {
            let filename = runner.create_migration(&name).await?;
            info!("Created migration: {filename}");
            Ok(())
        }
    }
}

async fn show_status(runner: &MigrationRunner) -> Result<(), MigrationError> {
    let applied = runner.list_applied().await?;
    let pending = runner.list_pending().await?;

    println!("=== Migration Status ===");

    if applied.is_empty() {
        println!("\nNo executed migrations");
    } else {
        println!("\nExecuted migrations:");
        for filename in &applied {
            println!("  ✓ {filename}");
        }
    }

    if pending.is_empty() {
        println!("\nNo pending migrations");
    } else {
        println!("\nPending migrations:");
        for filename in &pending {
            println!("  ○ {filename}");
        }
    }

    println!(
        "\nTotal: {} migrations ({} executed, {} pending)",
        applied.len() + pending.len(),
        applied.len(),
        pending.len()
    );
    Ok(())
}
