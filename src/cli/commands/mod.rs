//! Command implementations, one module per family of actions.

#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod record_cmd;
pub mod site;
pub mod vault_cmd;
