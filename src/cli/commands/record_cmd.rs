//! Record actions on a site of the default vault.
//!
//! Usage:
//!   gpam -n example.com alice hunter2 url=https://example.com
//!   gpam -n -i example.com alice      # then NAME=VALUE lines, empty to finish
//!   gpam -l example.com alice
//!   gpam -u example.com alice password=n3w
//!   gpam -u example.com alice login=bob   # change the login itself
//!   gpam -d example.com alice

use tracing::info;

use crate::action::Arguments;
use crate::cli::prompt::{self, LineReader};
use crate::cli::{output, Context};
use crate::errors::{GpamError, Result};
use crate::record::RecordCollection;
use crate::vault::store::rename_site;
use crate::vault::{VaultStore, LOGIN_FIELD};

const SITE_FIELD: &str = "site";

/// Site and login named by the first `site`/`login` records.
fn target(records: &RecordCollection) -> Result<(String, String)> {
    let site = records
        .value_of(SITE_FIELD)
        .ok_or(GpamError::SiteNotSpecified)?;
    let login = records
        .value_of(LOGIN_FIELD)
        .ok_or_else(|| GpamError::InvalidUsage("login has not been specified".into()))?;
    Ok((site.to_string(), login.to_string()))
}

// ---------------------------------------------------------------------------
// New
// ---------------------------------------------------------------------------

/// `-n SITE LOGIN [PASSWORD] [NAME=VALUE]...`
pub fn new_record(ctx: &Context, args: &Arguments) -> Result<()> {
    create(ctx, args.records.clone())
}

/// `-n -i SITE LOGIN`: read extra fields line by line first.
pub fn new_record_interactive(
    ctx: &Context,
    args: &Arguments,
    input: &mut dyn LineReader,
) -> Result<()> {
    let mut records = args.records.clone();
    prompt::read_records(input, &mut records)?;
    create(ctx, records)
}

fn create(ctx: &Context, mut records: RecordCollection) -> Result<()> {
    records.unique();
    let (site, login) = target(&records)?;
    let vault = ctx.default_vault()?;

    if !ctx.store.is_site_exists(&vault, &site)? {
        return Err(GpamError::SiteNotFound { vault, site });
    }

    let (position, created) = ctx.store.transaction(|doc| {
        let site_node = doc.require_site_mut(&vault, &site)?;
        let (position, created) = site_node.ensure_record(&login);
        let record = site_node
            .record_mut(position)
            .ok_or_else(|| GpamError::RecordNotFound {
                site: site.clone(),
                position,
            })?;
        for field in records.iter().filter(|r| r.name != SITE_FIELD) {
            record.upsert_field(&field.name, &field.value)?;
        }
        Ok((position, created))
    })?;

    info!(%vault, %site, position, created, "record saved");
    ctx.audit("new-record", Some(&vault), Some(&site), Some(&format!("login '{login}'")));

    if created {
        output::success(&format!("Record '{login}' added to site '{site}'."));
    } else {
        output::success(&format!("Record '{login}' on site '{site}' updated."));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// `-l SITE LOGIN`: print every field of the record.
pub fn list_record(ctx: &Context, args: &Arguments) -> Result<()> {
    let (site, login) = target(&args.records)?;
    let vault = ctx.default_vault()?;
    let fields = record_fields(&ctx.store, &vault, &site, &login)?;
    output::print_record_table(&site, &fields);
    Ok(())
}

/// `(name, value)` of every field of the record matched by `login`.
pub fn record_fields(
    store: &VaultStore,
    vault: &str,
    site: &str,
    login: &str,
) -> Result<Vec<(String, String)>> {
    if !store.is_site_exists(vault, site)? {
        return Err(GpamError::SiteNotFound {
            vault: vault.to_string(),
            site: site.to_string(),
        });
    }

    let position = store
        .get_record_position(vault, site, login)?
        .ok_or_else(|| GpamError::LoginNotFound {
            site: site.to_string(),
            login: login.to_string(),
        })?;

    let count = store.get_record_fields_count(vault, site, login)?;
    let mut fields = Vec::with_capacity(count);
    for index in 0..count {
        let name = store.get_record_field_name(vault, site, position, index)?;
        let value = store.get_record_field_value(vault, site, position, index)?;
        if let (Some(name), Some(value)) = (name, value) {
            fields.push((name, value));
        }
    }
    Ok(fields)
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// `-u SITE LOGIN NAME=VALUE...`
pub fn update_record(ctx: &Context, args: &Arguments) -> Result<()> {
    update(ctx, args.records.clone())
}

/// `-u -i SITE LOGIN`: read the changed fields line by line first.
pub fn update_record_interactive(
    ctx: &Context,
    args: &Arguments,
    input: &mut dyn LineReader,
) -> Result<()> {
    let mut records = args.records.clone();
    prompt::read_records(input, &mut records)?;
    update(ctx, records)
}

/// Locate the record by the first site/login given, then apply the
/// deduplicated fields: a `site` field renames the site, the last `login`
/// becomes the record's login, everything else is upserted.  One save.
fn update(ctx: &Context, mut records: RecordCollection) -> Result<()> {
    let (site, login) = target(&records)?;
    records.unique();
    let vault = ctx.default_vault()?;

    if !ctx.store.is_site_exists(&vault, &site)? {
        return Err(GpamError::SiteNotFound { vault, site });
    }

    let (changed, renamed_to) = ctx.store.transaction(|doc| {
        let position = doc
            .require_site(&vault, &site)?
            .record_position(&login)
            .ok_or_else(|| GpamError::LoginNotFound {
                site: site.clone(),
                login: login.clone(),
            })?;

        let record = doc.require_record_mut(&vault, &site, position)?;
        let mut renamed_to = None;
        let mut changed = 0;
        for field in records.iter() {
            if field.name == SITE_FIELD {
                if field.value != site {
                    renamed_to = Some(field.value.clone());
                }
                continue;
            }
            record.upsert_field(&field.name, &field.value)?;
            changed += 1;
        }

        if let Some(new_name) = &renamed_to {
            rename_site(doc, &vault, &site, new_name)?;
        }
        Ok((changed, renamed_to))
    })?;

    info!(%vault, %site, %login, changed, "record updated");
    let details = match &renamed_to {
        Some(new_name) => format!("login '{login}', site renamed to '{new_name}'"),
        None => format!("login '{login}'"),
    };
    ctx.audit("update-record", Some(&vault), Some(&site), Some(&details));

    output::success(&format!("Record '{login}' on site '{site}' updated."));
    if let Some(new_name) = renamed_to {
        output::info(&format!("Site '{site}' is now '{new_name}'."));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// `-d SITE LOGIN`
pub fn delete_record(ctx: &Context, args: &Arguments) -> Result<()> {
    let (site, login) = target(&args.records)?;
    let vault = ctx.default_vault()?;

    if !ctx.store.is_site_exists(&vault, &site)? {
        return Err(GpamError::SiteNotFound { vault, site });
    }

    let position = ctx
        .store
        .get_record_position(&vault, &site, &login)?
        .ok_or_else(|| GpamError::LoginNotFound {
            site: site.clone(),
            login: login.clone(),
        })?;
    ctx.store.delete_record(&vault, &site, position)?;

    info!(%vault, %site, position, "record deleted");
    ctx.audit("delete-record", Some(&vault), Some(&site), Some(&format!("login '{login}'")));
    output::success(&format!("Record '{login}' deleted from site '{site}'."));
    Ok(())
}
