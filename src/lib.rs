pub mod action;
pub mod cli;
pub mod config;
pub mod errors;
pub mod password;
pub mod record;
pub mod vault;

#[cfg(feature = "audit-log")]
pub mod audit;
