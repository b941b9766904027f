// Saltvault — CLI Command Handlers
//
// Each function handles one CLI subcommand. They are thin callers of the
// library's `CredentialStore` operations. The database handle is opened once
// per invocation and closed explicitly before exit.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::{Result, SaltvaultError};
use crate::store::{CredentialBackend, CredentialId, CredentialStore, Database, SqliteBackend};

use super::{Cli, Commands};

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();

    match cli.command {
        Commands::Init => with_store(&config, |_| cmd_init(&config)),
        Commands::Enroll => with_store(&config, |store| cmd_enroll(store, &mut input)),
        Commands::Verify { id } => with_store(&config, |store| cmd_verify(store, id, &mut input)),
        Commands::Rotate { id } => with_store(&config, |store| cmd_rotate(store, id, &mut input)),
        Commands::Delete { id } => with_store(&config, |store| cmd_delete(store, id)),
        Commands::Status { id } => with_store(&config, |store| cmd_status(store, id)),
    }
}

// ─── Init ────────────────────────────────────────────────────────────────────

fn cmd_init(config: &Config) -> Result<ExitCode> {
    println!("✓ Saltvault initialized");
    println!("  Database:    {}", config.database_path().display());
    println!("  KDF:         {:?}", config.kdf);
    println!("  Work factor: {}", config.work_factor());
    Ok(ExitCode::SUCCESS)
}

// ─── Enroll ──────────────────────────────────────────────────────────────────

fn cmd_enroll<B: CredentialBackend>(store: &CredentialStore<B>, input: &mut impl BufRead) -> Result<ExitCode> {
    let password = read_password(input, "Password")?;
    let confirm = read_password(input, "Confirm password")?;
    if *password != *confirm {
        return Err(SaltvaultError::Other("Passwords do not match".to_string()));
    }

    let id = store.enroll(&password)?;
    println!("✓ Credential enrolled");
    println!("  ID: {}", id);
    Ok(ExitCode::SUCCESS)
}

// ─── Verify ──────────────────────────────────────────────────────────────────

fn cmd_verify<B: CredentialBackend>(
    store: &CredentialStore<B>,
    id: CredentialId,
    input: &mut impl BufRead,
) -> Result<ExitCode> {
    let password = read_password(input, "Password")?;

    if store.verify(id, &password)? {
        println!("match");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no match");
        Ok(ExitCode::FAILURE)
    }
}

// ─── Rotate ──────────────────────────────────────────────────────────────────

fn cmd_rotate<B: CredentialBackend>(
    store: &CredentialStore<B>,
    id: CredentialId,
    input: &mut impl BufRead,
) -> Result<ExitCode> {
    let current = read_password(input, "Current password")?;
    let new = read_password(input, "New password")?;
    let confirm = read_password(input, "Confirm new password")?;
    if *new != *confirm {
        return Err(SaltvaultError::Other("Passwords do not match".to_string()));
    }

    if store.rotate(id, &current, &new)? {
        println!("✓ Credential {} rotated", id);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no match");
        Ok(ExitCode::FAILURE)
    }
}

// ─── Delete ──────────────────────────────────────────────────────────────────

fn cmd_delete<B: CredentialBackend>(store: &CredentialStore<B>, id: CredentialId) -> Result<ExitCode> {
    if store.delete(id)? {
        println!("✓ Credential {} deleted", id);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Credential not found: {}", id);
        Ok(ExitCode::FAILURE)
    }
}

// ─── Status ──────────────────────────────────────────────────────────────────

fn cmd_status<B: CredentialBackend>(store: &CredentialStore<B>, id: CredentialId) -> Result<ExitCode> {
    match store.needs_rehash(id)? {
        Some(true) => println!("Credential {}: derived with outdated parameters", id),
        Some(false) => println!("Credential {}: up to date", id),
        None => {
            println!("Credential not found: {}", id);
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open the database, run `f` against the store, then close the handle.
/// The outcome of `f` takes precedence over a close error.
fn with_store<T>(
    config: &Config,
    f: impl FnOnce(&CredentialStore<SqliteBackend>) -> Result<T>,
) -> Result<T> {
    let path = config.database_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let backend = SqliteBackend::new(Database::open(&path)?);
    let store = CredentialStore::from_config(backend, config)?;

    let outcome = f(&store);
    let closed = store.into_backend().into_database().close();

    let value = outcome?;
    closed?;
    Ok(value)
}

/// Prompt on stderr and read one line from `input`. Only the line ending is
/// stripped; leading and trailing spaces are part of the password.
fn read_password(input: &mut impl BufRead, prompt: &str) -> Result<Zeroizing<String>> {
    eprint!("{}: ", prompt);
    io::stderr().flush()?;

    let mut line = Zeroizing::new(String::new());
    if input.read_line(&mut line)? == 0 {
        return Err(SaltvaultError::Other("No password provided on stdin".to_string()));
    }

    let len = line.trim_end_matches(|c: char| c == '\r' || c == '\n').len();
    line.truncate(len);
    Ok(line)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
