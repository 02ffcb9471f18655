//! Vault module: the persisted vault/site/record/field tree.
//!
//! This module provides:
//! - Typed in-memory nodes and name/position lookups (`tree`)
//! - XML file format with atomic writes (`format`)
//! - High-level `VaultStore` with load-mutate-save CRUD (`store`)

pub mod format;
pub mod store;
pub mod tree;

// Re-export the most commonly used items.
pub use store::VaultStore;
pub use tree::{FieldNode, RecordNode, SiteNode, VaultNode, VaultsDocument, LOGIN_FIELD};
