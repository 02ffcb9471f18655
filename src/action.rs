//! Action resolution: maps one invocation's arguments to exactly one action.
//!
//! Resolution is a pure decision table: it never reads the vault file and
//! never fails.  Top-level overrides (`--add-vault`, `--set-default-vault`,
//! `--default-vault`, `--set-master-key`) win outright; otherwise the
//! presence of `site`/`login` fields selects a sub-table, and inside it the
//! mode flags are checked in the order delete > update > new > list, with
//! the interactive variant taking precedence when `-i` is also given.

use crate::record::RecordCollection;

/// Everything parsed from one invocation.
///
/// Built once by the CLI layer and passed by reference through resolution
/// and dispatch.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub records: RecordCollection,

    pub interactive: bool,
    pub new: bool,
    pub update: bool,
    pub list: bool,
    pub delete: bool,

    pub new_vault_name: Option<String>,
    pub new_default_vault_name: Option<String>,
    pub show_default_vault: bool,
    pub new_master_key_value: Option<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve these arguments to an action.
    pub fn action(&self) -> Action {
        resolve(self)
    }
}

/// The single resolved intent of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Unknown,

    // Incomplete or ambiguous commands.
    InvalidNewSiteSiteNotSpecified,
    InvalidNewRecordFieldsNotSpecified,
    InvalidUpdateSiteSiteNotSpecified,
    InvalidUpdateSiteNewSiteNotSpecified,
    InvalidUpdateRecordFieldsNotSpecified,
    InvalidDeleteSiteSiteNotSpecified,

    // Top-level.
    AddVault,
    SetDefaultVault,
    ShowDefaultVault,
    SetMasterKey,

    // -n / --new
    NewSite,
    NewSiteInteractive,
    NewRecordInteractive,
    NewRecordSpecifiedFields,

    // -l / --list
    ListSites,
    ListRecord,

    // -u / --update
    UpdateSiteInteractive,
    UpdateRecordInteractive,
    UpdateRecordSpecifiedFields,

    // -d / --delete
    DeleteSite,
    DeleteSiteInteractive,
    DeleteRecordFull,
}

impl Action {
    /// `true` for `Unknown` and every `Invalid*` sentinel.
    pub fn is_invalid(self) -> bool {
        self.usage_error().is_some()
    }

    /// Human-readable reason for an invalid action, `None` for executable ones.
    pub fn usage_error(self) -> Option<&'static str> {
        let msg = match self {
            Self::Unknown => "unknown usage of options or arguments",
            Self::InvalidNewSiteSiteNotSpecified => {
                "'-n' or '--new': site has not been specified"
            }
            Self::InvalidNewRecordFieldsNotSpecified => {
                "'-n' or '--new': fields for the new record have not been specified"
            }
            Self::InvalidUpdateSiteSiteNotSpecified => {
                "'-u' or '--update': site has not been specified"
            }
            Self::InvalidUpdateSiteNewSiteNotSpecified => {
                "'-u' or '--update': new site name has not been specified (use -i to enter it)"
            }
            Self::InvalidUpdateRecordFieldsNotSpecified => {
                "'-u' or '--update': fields for the updated record have not been specified"
            }
            Self::InvalidDeleteSiteSiteNotSpecified => {
                "'-d' or '--delete': site has not been specified"
            }
            _ => return None,
        };
        Some(msg)
    }
}

/// Resolve arguments to exactly one action.
pub fn resolve(args: &Arguments) -> Action {
    if args.new_vault_name.is_some() {
        return Action::AddVault;
    }
    if args.new_default_vault_name.is_some() {
        return Action::SetDefaultVault;
    }
    if args.show_default_vault {
        return Action::ShowDefaultVault;
    }
    if args.new_master_key_value.is_some() {
        return Action::SetMasterKey;
    }

    let site = args.records.get("site").is_some();
    let login = args.records.get("login").is_some();
    let others = args.records.len() > 2;

    let i = args.interactive;
    let (n, u, l, d) = (args.new, args.update, args.list, args.delete);

    match (site, login, others) {
        (false, false, false) => {
            if d && i {
                Action::DeleteSiteInteractive
            } else if u && i {
                Action::UpdateSiteInteractive
            } else if n && i {
                Action::NewSiteInteractive
            } else if l && i {
                Action::ListSites
            } else if d {
                Action::InvalidDeleteSiteSiteNotSpecified
            } else if u {
                Action::InvalidUpdateSiteSiteNotSpecified
            } else if n {
                Action::InvalidNewSiteSiteNotSpecified
            } else if l {
                Action::ListSites
            } else {
                Action::Unknown
            }
        }
        (true, false, false) => {
            if d && i {
                Action::DeleteSite
            } else if u && i {
                Action::UpdateSiteInteractive
            } else if n && i {
                Action::NewSite
            } else if l && i {
                Action::ListSites
            } else if d {
                Action::DeleteSite
            } else if u {
                Action::InvalidUpdateSiteNewSiteNotSpecified
            } else if n {
                Action::NewSite
            } else if l {
                Action::ListSites
            } else {
                Action::Unknown
            }
        }
        (true, true, others) => {
            if d {
                Action::DeleteRecordFull
            } else if u && i {
                Action::UpdateRecordInteractive
            } else if n && i {
                Action::NewRecordInteractive
            } else if u && others {
                Action::UpdateRecordSpecifiedFields
            } else if u {
                Action::InvalidUpdateRecordFieldsNotSpecified
            } else if n && others {
                Action::NewRecordSpecifiedFields
            } else if n {
                Action::InvalidNewRecordFieldsNotSpecified
            } else if l {
                Action::ListRecord
            } else {
                Action::Unknown
            }
        }
        _ => Action::Unknown,
    }
}
