use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fieldarea_service::{ServiceError, SessionStore, StaticIdentity};
use fieldarea_storage::FsObjectStore;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fieldarea")]
#[command(about = "Measure GPS polygon areas and manage saved field sessions", long_about = None)]
struct Cli {
    /// Root directory of the local session store.
    #[arg(long, global = true, env = "FIELDAREA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Signed-in user id. Session commands fail with NOT_AUTHENTICATED without it.
    #[arg(long, global = true, env = "FIELDAREA_UID")]
    uid: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Area enclosed by the points in FILE.
    Area { file: PathBuf },
    /// Extent of the points in FILE, plus a padded viewport.
    Bounds {
        file: PathBuf,
        /// Padding fraction per edge [env: FIELDAREA_BOUNDS_PADDING, default 0.15].
        #[arg(short, long)]
        padding: Option<f64>,
    },
    /// Change fingerprint of the points in FILE.
    Hash { file: PathBuf },
    /// Saved sessions, most recently updated first.
    List,
    /// Save the points in FILE as a new session.
    Save {
        file: PathBuf,
        #[arg(short, long)]
        name: String,
    },
    /// Replace the points of an existing session.
    Update { id: String, file: PathBuf },
    /// Print a saved session.
    Load { id: String },
    Rename { id: String, name: String },
    /// Delete a session and its index entry.
    Delete { id: String },
    /// Drop an index entry whose session can no longer be loaded.
    Repair { id: String },
    /// Regenerate the index from the stored sessions.
    RebuildIndex,
    /// Delete every session and the index.
    Purge {
        #[arg(long)]
        yes: bool,
    },
}

fn get_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| {
        dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("fieldarea")
    })
}

fn open_store(data_dir: Option<PathBuf>, uid: Option<String>) -> SessionStore {
    let root = get_data_dir(data_dir);
    tracing::debug!(root = %root.display(), "opening session store");
    SessionStore::new(
        Arc::new(FsObjectStore::new(root)),
        Arc::new(StaticIdentity::from_optional(uid)),
    )
}

async fn run(cli: Cli) -> Result<()> {
    let Cli { data_dir, uid, command } = cli;
    let store = || open_store(data_dir.clone(), uid.clone());

    match command {
        Commands::Area { file } => commands::geometry::run_area(&file)?,
        Commands::Bounds { file, padding } => commands::geometry::run_bounds(&file, padding)?,
        Commands::Hash { file } => commands::geometry::run_hash(&file)?,
        Commands::List => commands::sessions::run_list(&store()).await?,
        Commands::Save { file, name } => commands::sessions::run_save(&store(), &file, &name).await?,
        Commands::Update { id, file } => commands::sessions::run_update(&store(), &id, &file).await?,
        Commands::Load { id } => commands::sessions::run_load(&store(), &id).await?,
        Commands::Rename { id, name } => commands::sessions::run_rename(&store(), &id, &name).await?,
        Commands::Delete { id } => commands::sessions::run_delete(&store(), &id).await?,
        Commands::Repair { id } => commands::sessions::run_repair(&store(), &id).await?,
        Commands::RebuildIndex => commands::sessions::run_rebuild_index(&store()).await?,
        Commands::Purge { yes } => {
            anyhow::ensure!(yes, "refusing to delete all sessions without --yes");
            commands::sessions::run_purge(&store()).await?;
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ServiceError>().and_then(ServiceError::code) {
                Some(code) => eprintln!("Error [{code}]: {e}"),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        },
    }
}
