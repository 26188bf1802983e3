use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kodi_provider::{addon_id_from_plugin_path, EntityKind, KodiLibrary, ParseEntityKindError};
use serde_json::json;
use skinkit_core::{
    init_logging, AbortFlag, AbortSignal, AppDirs, Config, DbId, FileMutex, LockOptions,
    LockOutcome, MemoryDirectory,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

/// Exit status when an interrupt arrives before the lock is taken.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "skinkit", version, about = "Kodi skin helper toolkit")]
struct Cli {
    /// JSON-RPC endpoint override (takes precedence over config)
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the flattened listing for one library entity as JSON
    Details {
        /// addon, set, movie, tvshow, season or episode
        kind: String,
        id: String,
    },
    /// Print the cast listing of a movie, show or episode as JSON
    Cast { kind: String, id: String },
    /// Print the addon id embedded in a plugin:// path
    AddonId { path: String },
    /// Run a command while holding a lock marker
    Lock(LockCommand),
}

#[derive(Debug, Parser, Clone)]
struct LockCommand {
    /// Marker file; relative names resolve under the lock directory
    marker: PathBuf,
    /// Give up waiting after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Delay between acquisition attempts
    #[arg(long)]
    poll_ms: Option<u64>,
    /// Command and arguments to run
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

#[derive(Debug, Error)]
enum SelectorError {
    #[error(transparent)]
    Kind(#[from] ParseEntityKindError),
    #[error("{kind} ids must be numeric, got '{value}'")]
    NotNumeric { kind: EntityKind, value: String },
    #[error("cast listings are only available for movies, tvshows and episodes")]
    CastUnsupported,
}

fn parse_selector(kind: &str, id: &str) -> Result<(EntityKind, DbId), SelectorError> {
    let kind: EntityKind = kind.parse()?;
    if kind.uses_string_id() {
        return Ok((kind, DbId::from(id)));
    }

    id.trim()
        .parse::<i64>()
        .map(|n| (kind, DbId::Number(n)))
        .map_err(|_| SelectorError::NotNumeric {
            kind,
            value: id.to_string(),
        })
}

fn listing_json(directory: &MemoryDirectory) -> serde_json::Value {
    json!({
        "content": directory.content,
        "items": directory.entries,
    })
}

impl LockCommand {
    fn options(&self, config: &Config) -> LockOptions {
        let mut options = config.lock.options();
        if let Some(ms) = self.timeout_ms {
            options.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.poll_ms {
            options.poll_interval = Duration::from_millis(ms.max(1));
        }
        options
    }
}

fn resolve_marker(marker: &Path, lock_dir: &Path) -> PathBuf {
    if marker.is_absolute() {
        marker.to_path_buf()
    } else {
        lock_dir.join(marker)
    }
}

/// Runs `command` under the marker and returns its exit status.
///
/// A timed-out wait still runs the command, unlocked. An abort before the
/// lock is taken skips it.
fn run_locked(
    marker: &Path,
    options: &LockOptions,
    command: &[String],
    abort: &dyn AbortSignal,
) -> Result<u8> {
    let (program, args) = command.split_first().context("no command given")?;
    let mut lock = FileMutex::acquire(marker, options, abort)?;

    match lock.outcome() {
        LockOutcome::Aborted => return Ok(EXIT_INTERRUPTED),
        LockOutcome::TimedOut => {
            tracing::warn!(marker = %marker.display(), "running without the lock")
        }
        LockOutcome::Acquired => {}
    }

    let status = std::process::Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to run {program}"));
    if lock.is_held() {
        lock.release()?;
    }

    let code = status?.code().unwrap_or(1);
    tracing::debug!(program = %program, code, "command finished");
    Ok(u8::try_from(code).unwrap_or(1))
}

fn execute(command: Command, config: &Config, dirs: &AppDirs, abort: &AbortFlag) -> Result<u8> {
    match command {
        Command::Details { kind, id } => {
            let (kind, dbid) = parse_selector(&kind, &id)?;
            let library = KodiLibrary::from_config(&config.kodi)?;
            let mut directory = MemoryDirectory::new();
            library.get_directory(kind, &dbid, &mut directory);
            println!("{}", serde_json::to_string_pretty(&listing_json(&directory))?);
        }
        Command::Cast { kind, id } => {
            let (kind, dbid) = parse_selector(&kind, &id)?;
            if !kind.supports_cast() {
                return Err(SelectorError::CastUnsupported.into());
            }
            let library = KodiLibrary::from_config(&config.kodi)?;
            let mut directory = MemoryDirectory::new();
            library.get_cast_directory(kind, &dbid, &mut directory);
            println!("{}", serde_json::to_string_pretty(&listing_json(&directory))?);
        }
        Command::AddonId { path } => match addon_id_from_plugin_path(&path) {
            Some(addon_id) => println!("{addon_id}"),
            None => {
                eprintln!("not a plugin path: {path}");
                return Ok(1);
            }
        },
        Command::Lock(lock) => {
            let lock_dir = config.lock.lock_dir(dirs);
            std::fs::create_dir_all(&lock_dir)
                .with_context(|| format!("failed to create {}", lock_dir.display()))?;
            let marker = resolve_marker(&lock.marker, &lock_dir);
            return run_locked(&marker, &lock.options(config), &lock.command, abort);
        }
    }

    Ok(0)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let mut config = Config::load_or_default(&dirs)?;
    if let Some(url) = cli.url {
        config.kodi.url = url;
    }
    let logging = init_logging(&config.logging, &dirs)?;
    tracing::debug!(endpoint = %config.kodi.url, "skinkit starting");

    let abort = AbortFlag::new();
    if matches!(cli.command, Command::Lock(_)) {
        let signal = abort.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, abandoning lock wait");
                signal.raise();
            }
        });
    }

    let command = cli.command;
    let code =
        tokio::task::spawn_blocking(move || execute(command, &config, &dirs, &abort)).await??;

    drop(logging);
    Ok(ExitCode::from(code))
}
