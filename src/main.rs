use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use gpam::action::Action;
use gpam::cli::commands::{completions, record_cmd, site, vault_cmd};
use gpam::cli::prompt::Terminal;
use gpam::cli::{arguments, load_settings, output, vault_path, Cli, Context};
use gpam::config::settings::home_dir;
use gpam::config::Settings;
use gpam::errors::{GpamError, Result};
use gpam::vault::VaultStore;

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = run(&cli, &matches) {
        output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli, matches: &ArgMatches) -> Result<()> {
    if cli.version {
        println!("gpam {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if let Some(shell) = cli.completions {
        return completions::execute(shell);
    }

    let home = home_dir().ok();
    let settings = load_settings(home.as_deref())?;
    init_tracing(cli.verbose, &settings);

    let vault_file = vault_path(cli, &settings, home.as_deref())?;
    tracing::debug!(path = %vault_file.display(), "using vault file");

    if cli.audit {
        return show_audit(&vault_file, cli.last, cli.since.as_deref());
    }

    let args = arguments::build(cli, matches)?;
    let action = args.action();
    if let Some(reason) = action.usage_error() {
        return Err(GpamError::InvalidUsage(reason.to_string()));
    }

    let store = VaultStore::open(&vault_file)?;
    store.initialize()?;
    let ctx = Context::new(store, settings.audit_log);
    let mut input = Terminal::new();

    match action {
        Action::AddVault => vault_cmd::add_vault(&ctx, required(&args.new_vault_name)?),
        Action::SetDefaultVault => {
            vault_cmd::set_default_vault(&ctx, required(&args.new_default_vault_name)?)
        }
        Action::ShowDefaultVault => vault_cmd::show_default_vault(&ctx),
        Action::SetMasterKey => {
            vault_cmd::set_master_key(&ctx, required(&args.new_master_key_value)?)
        }

        Action::NewSite => site::new_site(&ctx, &args),
        Action::NewSiteInteractive => site::new_site_interactive(&ctx, &args, &mut input),
        Action::NewRecordSpecifiedFields => record_cmd::new_record(&ctx, &args),
        Action::NewRecordInteractive => {
            record_cmd::new_record_interactive(&ctx, &args, &mut input)
        }

        Action::ListSites => site::list_sites(&ctx),
        Action::ListRecord => record_cmd::list_record(&ctx, &args),

        Action::UpdateSiteInteractive => site::update_site_interactive(&ctx, &args, &mut input),
        Action::UpdateRecordSpecifiedFields => record_cmd::update_record(&ctx, &args),
        Action::UpdateRecordInteractive => {
            record_cmd::update_record_interactive(&ctx, &args, &mut input)
        }

        Action::DeleteSite => site::delete_site(&ctx, &args),
        Action::DeleteSiteInteractive => site::delete_site_interactive(&ctx, &mut input),
        Action::DeleteRecordFull => record_cmd::delete_record(&ctx, &args),

        invalid => Err(GpamError::InvalidUsage(format!("{invalid:?}"))),
    }
}

/// Install the stderr logger: `GPAM_LOG`, else `--verbose`, else the setting.
fn init_tracing(verbose: bool, settings: &Settings) {
    let filter = EnvFilter::try_from_env("GPAM_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("gpam=debug")
        } else {
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn required(value: &Option<String>) -> Result<&str> {
    value
        .as_deref()
        .ok_or_else(|| GpamError::InvalidUsage("missing option value".into()))
}

#[cfg(feature = "audit-log")]
fn show_audit(vault_file: &std::path::Path, last: usize, since: Option<&str>) -> Result<()> {
    gpam::cli::commands::audit_cmd::execute(vault_file, last, since)
}

#[cfg(not(feature = "audit-log"))]
fn show_audit(_vault_file: &std::path::Path, _last: usize, _since: Option<&str>) -> Result<()> {
    Err(GpamError::AuditError(
        "this build has no audit log (rebuild with the `audit-log` feature)".into(),
    ))
}
