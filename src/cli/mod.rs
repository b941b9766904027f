// Saltvault — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: init, enroll, verify, rotate, delete, status.
// Passwords are read from stdin, never from arguments.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::store::CredentialId;

pub use commands::execute;

/// Saltvault — salted password verifier store.
#[derive(Parser, Debug)]
#[command(name = "saltvault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, env = "SALTVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the configuration file).
    #[arg(long, global = true, env = "SALTVAULT_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and its schema.
    Init,

    /// Enroll a new password (prompted twice on stdin) and print its ID.
    Enroll,

    /// Check a password (read from stdin) against a stored credential.
    /// Exits 0 on match, 1 otherwise.
    Verify {
        /// The credential ID.
        id: CredentialId,
    },

    /// Replace a credential's password after checking the current one.
    Rotate {
        /// The credential ID.
        id: CredentialId,
    },

    /// Delete a credential.
    Delete {
        /// The credential ID.
        id: CredentialId,
    },

    /// Report whether a credential uses outdated derivation parameters.
    Status {
        /// The credential ID.
        id: CredentialId,
    },
}
