//! Top-level vault actions.
//!
//! Usage:
//!   gpam --add-vault work             # add and make default
//!   gpam --set-default-vault home
//!   gpam --default-vault
//!   gpam --set-master-key VALUE

use tracing::info;

use crate::cli::{output, Context};
use crate::errors::Result;

/// Add a vault and make it the default, in a single save.
pub fn add_vault(ctx: &Context, name: &str) -> Result<()> {
    let created = ctx.store.transaction(|doc| {
        let created = doc.add_vault(name)?;
        doc.set_default_vault(name)?;
        Ok(created)
    })?;

    info!(vault = name, created, "vault added and set as default");
    ctx.audit("add-vault", Some(name), None, None);

    if created {
        output::success(&format!("Vault '{name}' created and set as default."));
    } else {
        output::success(&format!("Vault '{name}' already exists; set as default."));
    }
    Ok(())
}

/// Move the default marker to an existing vault.
pub fn set_default_vault(ctx: &Context, name: &str) -> Result<()> {
    ctx.store.set_default_vault(name)?;

    info!(vault = name, "default vault changed");
    ctx.audit("set-default-vault", Some(name), None, None);
    output::success(&format!("Default vault is now '{name}'."));
    Ok(())
}

/// Print the default vault's name.
pub fn show_default_vault(ctx: &Context) -> Result<()> {
    let name = ctx.default_vault()?;
    println!("{name}");
    Ok(())
}

/// Store the master key attribute. The value itself is never logged.
pub fn set_master_key(ctx: &Context, value: &str) -> Result<()> {
    ctx.store.set_master_key(value)?;

    info!("master key updated");
    ctx.audit("set-master-key", None, None, None);
    output::success("Master key updated.");
    Ok(())
}
