//! CLI module: Clap argument parser, input/output helpers, and command implementations.

pub mod arguments;
pub mod commands;
pub mod output;
pub mod prompt;

use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;

use crate::config::Settings;
use crate::errors::{GpamError, Result};
use crate::vault::VaultStore;

/// GPAM: a local credential manager with vaults, sites, and records.
#[derive(Parser, Debug, Default)]
#[command(
    name = "gpam",
    about = "Local credential manager: vaults, sites, and records",
    disable_version_flag = true,
    after_help = "Positional arguments: [SITE [LOGIN [PASSWORD]]] [NAME=VALUE]..."
)]
pub struct Cli {
    /// Prompt for anything not given on the command line
    #[arg(short, long)]
    pub interactive: bool,

    /// Create a site or a record
    #[arg(short, long)]
    pub new: bool,

    /// List sites, or the fields of one record
    #[arg(short, long)]
    pub list: bool,

    /// Update a site or a record
    #[arg(short, long)]
    pub update: bool,

    /// Delete a site or a record
    #[arg(short, long)]
    pub delete: bool,

    /// Site name
    #[arg(short = 'S', long, value_name = "SITE")]
    pub site: Option<String>,

    /// Login of the record
    #[arg(short = 'L', long, value_name = "LOGIN")]
    pub login: Option<String>,

    /// Password of the record
    #[arg(short = 'P', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Name of an extra record field (pair with -V)
    #[arg(short = 'F', long = "field", value_name = "NAME")]
    pub fields: Vec<String>,

    /// Value of the preceding -F field
    #[arg(short = 'V', long = "value", value_name = "VALUE")]
    pub values: Vec<String>,

    /// Generate a random password of LEN characters
    #[arg(short = 'g', long = "generate", value_name = "LEN")]
    pub generate: Option<usize>,

    /// Add a vault and make it the default
    #[arg(long, value_name = "NAME")]
    pub add_vault: Option<String>,

    /// Make an existing vault the default
    #[arg(long, value_name = "NAME")]
    pub set_default_vault: Option<String>,

    /// Show the default vault
    #[arg(long)]
    pub default_vault: bool,

    /// Store the master key attribute
    #[arg(long, value_name = "VALUE")]
    pub set_master_key: Option<String>,

    /// [SITE [LOGIN [PASSWORD]]] [NAME=VALUE]...
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Vault file (default: ~/.gpam.vaults.xml)
    #[arg(long, env = "GPAM_VAULT_FILE", value_name = "PATH")]
    pub vault_file: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long)]
    pub verbose: bool,

    /// View the audit log of vault operations
    #[arg(long)]
    pub audit: bool,

    /// Number of audit entries to show
    #[arg(long, default_value = "50")]
    pub last: usize,

    /// Show audit entries since a duration ago (e.g. 7d, 24h, 30m)
    #[arg(long)]
    pub since: Option<String>,

    /// Print a completion script for SHELL
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completions: Option<Shell>,

    /// Print version
    #[arg(long)]
    pub version: bool,
}

// ---------------------------------------------------------------------------
// Shared state for command handlers
// ---------------------------------------------------------------------------

/// What every command handler needs: the opened vault file and whether
/// mutations are recorded in the audit log.
#[derive(Debug, Clone)]
pub struct Context {
    pub store: VaultStore,
    pub audit_log: bool,
}

impl Context {
    pub fn new(store: VaultStore, audit_log: bool) -> Self {
        Self { store, audit_log }
    }

    /// Name of the default vault; an error if none is set.
    pub fn default_vault(&self) -> Result<String> {
        self.store
            .get_default_vault()?
            .ok_or(GpamError::DefaultVaultNotSet)
    }

    /// Record a completed mutation. Never fails the caller.
    pub fn audit(&self, op: &str, vault: Option<&str>, site: Option<&str>, details: Option<&str>) {
        if !self.audit_log {
            return;
        }

        #[cfg(feature = "audit-log")]
        crate::audit::log_audit(self.store.path(), op, vault, site, details);

        #[cfg(not(feature = "audit-log"))]
        let _ = (op, vault, site, details);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault file location.
///
/// `--vault-file` / `GPAM_VAULT_FILE` wins; otherwise the `vault_file`
/// setting, relative to the home directory.
pub fn vault_path(cli: &Cli, settings: &Settings, home: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = &cli.vault_file {
        return Ok(path.clone());
    }

    let settings_path = Path::new(&settings.vault_file);
    if settings_path.is_absolute() {
        return Ok(settings_path.to_path_buf());
    }

    home.map(|home| settings.vault_path(home)).ok_or_else(|| {
        GpamError::ConfigError(
            "cannot determine the home directory; pass --vault-file or set GPAM_VAULT_FILE".into(),
        )
    })
}

/// Load settings from the home directory, or defaults when there is none.
pub fn load_settings(home: Option<&Path>) -> Result<Settings> {
    match home {
        Some(home) => Settings::load(home),
        None => Ok(Settings::default()),
    }
}
