use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes reported by the `gpam` binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const USER_ABORT: i32 = 1;
    pub const ACTION_ERROR: i32 = 2;
    pub const PARSE_ERROR: i32 = 3;
    pub const ACCESS_ERROR: i32 = 4;
    pub const INITIALIZE_ERROR: i32 = 5;
    pub const INCORRECT_PATH_ERROR: i32 = 6;
    pub const VAULT_NOT_SET_ERROR: i32 = 7;
    pub const SITE_NOT_SET_ERROR: i32 = 8;
    pub const SITE_NOT_EXISTS_ERROR: i32 = 9;
}

/// All errors that can occur in GPAM.
#[derive(Debug, Error)]
pub enum GpamError {
    // --- Vault file errors ---
    #[error("Can't access vault file {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't initialize vault file {0}")]
    Initialize(PathBuf),

    #[error("Invalid vault document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Lookup errors ---
    #[error("Vault '{0}' does not exist")]
    VaultNotFound(String),

    #[error("Site '{site}' does not exist in vault '{vault}'")]
    SiteNotFound { vault: String, site: String },

    #[error("Record #{position} does not exist for site '{site}'")]
    RecordNotFound { site: String, position: usize },

    #[error("No record with login '{login}' for site '{site}'")]
    LoginNotFound { site: String, login: String },

    #[error("Default vault is not set (use --set-default-vault <NAME>)")]
    DefaultVaultNotSet,

    #[error("Site has not been specified")]
    SiteNotSpecified,

    // --- Argument errors ---
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    #[error("Field name for the value \"{0}\" was never specified")]
    FieldNameNotSpecified(String),

    #[error("Value for the field \"{0}\" was never specified")]
    FieldValueNotSpecified(String),

    #[error("Field \"{0}\" is declared incorrectly")]
    InvalidFieldDeclaration(String),

    #[error("Invalid {kind} name '{name}': names cannot be empty")]
    InvalidName { kind: &'static str, name: String },

    #[error("{0}. Aborted")]
    UserAborted(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Misc ---
    #[error("Audit error: {0}")]
    AuditError(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl GpamError {
    /// Map an error to the process exit code the binary reports.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UserAborted(_) => exit_code::USER_ABORT,
            Self::InvalidUsage(_) => exit_code::ACTION_ERROR,
            Self::Access { .. } | Self::Io(_) => exit_code::ACCESS_ERROR,
            Self::Initialize(_) => exit_code::INITIALIZE_ERROR,
            Self::ConfigError(_) => exit_code::INCORRECT_PATH_ERROR,
            Self::DefaultVaultNotSet => exit_code::VAULT_NOT_SET_ERROR,
            Self::SiteNotSpecified => exit_code::SITE_NOT_SET_ERROR,
            Self::SiteNotFound { .. } => exit_code::SITE_NOT_EXISTS_ERROR,
            _ => exit_code::PARSE_ERROR,
        }
    }
}

/// Convenience type alias for GPAM results.
pub type Result<T> = std::result::Result<T, GpamError>;
