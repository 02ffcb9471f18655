//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the sites of a vault, one per row.
pub fn print_sites_table(vault: &str, sites: &[String]) {
    if sites.is_empty() {
        info(&format!("No sites in vault '{vault}' yet."));
        tip("Run `gpam -n <SITE>` to add your first site.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Site"]);

    for (index, site) in sites.iter().enumerate() {
        table.add_row(vec![index.to_string(), site.clone()]);
    }

    println!("{}", style(format!("Vault '{vault}':")).bold());
    println!("{table}");
}

/// Print the fields of one record as a two-column table.
pub fn print_record_table(site: &str, fields: &[(String, String)]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    for (name, value) in fields {
        table.add_row(vec![name.clone(), value.clone()]);
    }

    println!("{}", style(format!("Site '{site}':")).bold());
    println!("{table}");
}
