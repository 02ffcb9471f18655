//! `gpam --audit`: display the audit log.
//!
//! Usage:
//!   gpam --audit                 # show last 50 entries
//!   gpam --audit --last 20       # show last 20
//!   gpam --audit --since 7d      # entries from last 7 days

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::errors::{GpamError, Result};

/// Show recent entries for the vault file at `vault_file`.
pub fn execute(vault_file: &Path, last: usize, since: Option<&str>) -> Result<()> {
    let audit = AuditLog::open(&AuditLog::dir_for(vault_file))
        .ok_or_else(|| GpamError::AuditError("failed to open audit database".into()))?;

    let since_dt = since.map(parse_since).transpose()?;
    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

/// Turn "7d", "24h", or "30m" into the instant that long ago.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        GpamError::InvalidUsage(format!(
            "invalid duration '{input}': use a form like 7d, 24h, or 30m"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let amount: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;

    let span = match unit {
        'd' => TimeDelta::try_days(amount),
        'h' => TimeDelta::try_hours(amount),
        'm' => TimeDelta::try_minutes(amount),
        _ => return Err(invalid()),
    }
    .ok_or_else(invalid)?;
    Utc::now().checked_sub_signed(span).ok_or_else(invalid)
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Vault", "Site", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.vault.clone().unwrap_or_else(|| "-".into()),
            entry.site.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Green for additions, blue for updates, red for deletions.
fn colorize_operation(op: &str) -> String {
    match op {
        "add-vault" | "new-site" | "new-record" => style(op).green().to_string(),
        "update-site" | "update-record" | "set-default-vault" => style(op).blue().to_string(),
        "delete-site" | "delete-record" => style(op).red().to_string(),
        "set-master-key" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}
