//! Site actions on the default vault.
//!
//! Usage:
//!   gpam -n example.com         # add a site
//!   gpam -n -i                  # prompt for the site name
//!   gpam -l                     # list sites
//!   gpam -u -i example.com      # rename (prompts for the new name)
//!   gpam -d example.com         # delete a site and all its records

use tracing::info;

use crate::action::Arguments;
use crate::cli::prompt::{self, LineReader};
use crate::cli::{output, Context};
use crate::errors::{GpamError, Result};
use crate::vault::VaultStore;

const EMPTY_SITE: &str = "Empty site name";

/// `-n SITE`
pub fn new_site(ctx: &Context, args: &Arguments) -> Result<()> {
    let site = args
        .records
        .value_of("site")
        .ok_or(GpamError::SiteNotSpecified)?;
    create(ctx, site)
}

/// `-n -i`: prompt for the site name.
pub fn new_site_interactive(ctx: &Context, args: &Arguments, input: &mut dyn LineReader) -> Result<()> {
    let vault = ctx.default_vault()?;
    let site = match args.records.value_of("site") {
        Some(site) => site.to_string(),
        None => prompt::read_name(input, "Enter site name", EMPTY_SITE)?,
    };
    create_in(ctx, &vault, &site)
}

fn create(ctx: &Context, site: &str) -> Result<()> {
    let vault = ctx.default_vault()?;
    create_in(ctx, &vault, site)
}

fn create_in(ctx: &Context, vault: &str, site: &str) -> Result<()> {
    ctx.store.add_site(vault, site)?;

    info!(vault, site, "site added");
    ctx.audit("new-site", Some(vault), Some(site), None);
    output::success(&format!("Site '{site}' added to vault '{vault}'."));
    Ok(())
}

/// `-l`: list the sites of the default vault.
pub fn list_sites(ctx: &Context) -> Result<()> {
    let vault = ctx.default_vault()?;
    let sites = site_names(&ctx.store, &vault)?;
    output::print_sites_table(&vault, &sites);
    Ok(())
}

/// Names of every site in `vault`, in document order.
pub fn site_names(store: &VaultStore, vault: &str) -> Result<Vec<String>> {
    let count = store.get_sites_count(vault)?;
    let mut names = Vec::with_capacity(count);
    for position in 0..count {
        match store.get_site_name(vault, position)? {
            Some(name) => names.push(name),
            None => output::warning(&format!("Can't read site #{position} of vault '{vault}'")),
        }
    }
    Ok(names)
}

/// `-u -i [SITE]`: prompt for the new name (and the current one if absent).
pub fn update_site_interactive(
    ctx: &Context,
    args: &Arguments,
    input: &mut dyn LineReader,
) -> Result<()> {
    let vault = ctx.default_vault()?;
    let site = match args.records.value_of("site") {
        Some(site) => site.to_string(),
        None => prompt::read_name(input, "Enter site name", EMPTY_SITE)?,
    };
    if !ctx.store.is_site_exists(&vault, &site)? {
        return Err(GpamError::SiteNotFound { vault, site });
    }

    let new_name = prompt::read_name(input, "Enter new site name", EMPTY_SITE)?;
    ctx.store.set_site_name(&vault, &site, &new_name)?;

    info!(%vault, %site, %new_name, "site renamed");
    ctx.audit("update-site", Some(&vault), Some(&new_name), Some(&format!("renamed from '{site}'")));
    output::success(&format!("Site '{site}' renamed to '{new_name}'."));
    Ok(())
}

/// `-d SITE`
pub fn delete_site(ctx: &Context, args: &Arguments) -> Result<()> {
    let site = args
        .records
        .value_of("site")
        .ok_or(GpamError::SiteNotSpecified)?;
    let vault = ctx.default_vault()?;
    remove(ctx, &vault, site)
}

/// `-d -i`: prompt for the site to delete.
pub fn delete_site_interactive(ctx: &Context, input: &mut dyn LineReader) -> Result<()> {
    let vault = ctx.default_vault()?;
    let site = prompt::read_name(input, "Enter site name", EMPTY_SITE)?;
    remove(ctx, &vault, &site)
}

fn remove(ctx: &Context, vault: &str, site: &str) -> Result<()> {
    ctx.store.delete_site(vault, site)?;

    info!(vault, site, "site deleted");
    ctx.audit("delete-site", Some(vault), Some(site), None);
    output::success(&format!("Site '{site}' deleted from vault '{vault}'."));
    Ok(())
}
