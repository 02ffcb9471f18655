//! Typed in-memory form of the vault document.
//!
//! `vaults → vault → site → record → record-field`.  Lookups are plain
//! equality matches on names and field values; nothing is ever spliced
//! into a query string.
//!
//! Addressing: record positions are 1-based ordinals among the records of
//! a site.  Site and field positions are 0-based indices.

use crate::errors::{GpamError, Result};

/// Name of the field whose value identifies a record.
pub const LOGIN_FIELD: &str = "login";

/// The whole persisted tree (`<vaults master-key="...">`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultsDocument {
    pub master_key: String,
    pub vaults: Vec<VaultNode>,
}

/// `<vault name="..." default="yes"?>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultNode {
    pub name: String,
    pub is_default: bool,
    pub sites: Vec<SiteNode>,
}

/// `<site name="...">`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteNode {
    pub name: String,
    pub records: Vec<RecordNode>,
}

/// `<record>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordNode {
    pub fields: Vec<FieldNode>,
}

/// `<record-field name="...">VALUE</record-field>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNode {
    pub name: String,
    pub value: String,
}

/// Convert a 1-based ordinal to a vector index.
pub fn ordinal_index(position: usize) -> Option<usize> {
    position.checked_sub(1)
}

// ---------------------------------------------------------------------------
// VaultsDocument
// ---------------------------------------------------------------------------

impl VaultsDocument {
    pub fn vault(&self, name: &str) -> Option<&VaultNode> {
        self.vaults.iter().find(|v| v.name == name)
    }

    pub fn vault_mut(&mut self, name: &str) -> Option<&mut VaultNode> {
        self.vaults.iter_mut().find(|v| v.name == name)
    }

    /// The vault carrying the default marker, if any.
    pub fn default_vault(&self) -> Option<&VaultNode> {
        self.vaults.iter().find(|v| v.is_default)
    }

    /// Append a vault unless one with that name exists.
    ///
    /// Returns `true` if the vault was created.
    pub fn add_vault(&mut self, name: &str) -> Result<bool> {
        validate_name("vault", name)?;
        if self.vault(name).is_some() {
            return Ok(false);
        }
        self.vaults.push(VaultNode {
            name: name.to_string(),
            ..VaultNode::default()
        });
        Ok(true)
    }

    /// Move the default marker to `name`.
    ///
    /// The target is checked first, so on error the document is untouched.
    pub fn set_default_vault(&mut self, name: &str) -> Result<()> {
        if self.vault(name).is_none() {
            return Err(GpamError::VaultNotFound(name.to_string()));
        }
        for vault in &mut self.vaults {
            vault.is_default = vault.name == name;
        }
        Ok(())
    }

    pub fn require_vault(&self, name: &str) -> Result<&VaultNode> {
        self.vault(name)
            .ok_or_else(|| GpamError::VaultNotFound(name.to_string()))
    }

    pub fn require_vault_mut(&mut self, name: &str) -> Result<&mut VaultNode> {
        self.vault_mut(name)
            .ok_or_else(|| GpamError::VaultNotFound(name.to_string()))
    }

    pub fn require_site(&self, vault: &str, site: &str) -> Result<&SiteNode> {
        self.require_vault(vault)?
            .site(site)
            .ok_or_else(|| site_not_found(vault, site))
    }

    pub fn require_site_mut(&mut self, vault: &str, site: &str) -> Result<&mut SiteNode> {
        self.require_vault_mut(vault)?
            .site_mut(site)
            .ok_or_else(|| site_not_found(vault, site))
    }

    pub fn require_record_mut(
        &mut self,
        vault: &str,
        site: &str,
        position: usize,
    ) -> Result<&mut RecordNode> {
        self.require_site_mut(vault, site)?
            .record_mut(position)
            .ok_or_else(|| GpamError::RecordNotFound {
                site: site.to_string(),
                position,
            })
    }
}

// ---------------------------------------------------------------------------
// VaultNode / SiteNode / RecordNode
// ---------------------------------------------------------------------------

impl VaultNode {
    pub fn site(&self, name: &str) -> Option<&SiteNode> {
        self.sites.iter().find(|s| s.name == name)
    }

    pub fn site_mut(&mut self, name: &str) -> Option<&mut SiteNode> {
        self.sites.iter_mut().find(|s| s.name == name)
    }

    /// Append a site unless one with that name exists.  Returns `true` if created.
    pub fn add_site(&mut self, name: &str) -> Result<bool> {
        validate_name("site", name)?;
        if self.site(name).is_some() {
            return Ok(false);
        }
        self.sites.push(SiteNode {
            name: name.to_string(),
            ..SiteNode::default()
        });
        Ok(true)
    }

    /// Remove a site and everything under it.  Returns `false` if absent.
    pub fn remove_site(&mut self, name: &str) -> bool {
        let before = self.sites.len();
        self.sites.retain(|s| s.name != name);
        self.sites.len() != before
    }
}

impl SiteNode {
    /// 1-based position of the first record whose login equals `login`.
    pub fn record_position(&self, login: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.login() == Some(login))
            .map(|index| index + 1)
    }

    /// Record at a 1-based position.
    pub fn record(&self, position: usize) -> Option<&RecordNode> {
        self.records.get(ordinal_index(position)?)
    }

    pub fn record_mut(&mut self, position: usize) -> Option<&mut RecordNode> {
        self.records.get_mut(ordinal_index(position)?)
    }

    /// Position of the record with this login, appending an empty record
    /// if there is none.  The second value is `true` if a record was created.
    pub fn ensure_record(&mut self, login: &str) -> (usize, bool) {
        match self.record_position(login) {
            Some(position) => (position, false),
            None => {
                self.records.push(RecordNode::default());
                (self.records.len(), true)
            }
        }
    }

    /// Remove the record at a 1-based position; later records shift down.
    pub fn remove_record(&mut self, position: usize) -> Option<RecordNode> {
        let index = ordinal_index(position).filter(|i| *i < self.records.len())?;
        Some(self.records.remove(index))
    }
}

impl RecordNode {
    /// First field named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field at a 0-based position.
    pub fn field_at(&self, index: usize) -> Option<&FieldNode> {
        self.fields.get(index)
    }

    pub fn login(&self) -> Option<&str> {
        self.field(LOGIN_FIELD).map(|f| f.value.as_str())
    }

    /// Overwrite the first field named `name`, or append a new one.
    ///
    /// Returns `true` if a field was appended.
    pub fn upsert_field(&mut self, name: &str, value: &str) -> Result<bool> {
        validate_name("field", name)?;
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value.to_string();
            return Ok(false);
        }
        self.fields.push(FieldNode {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn site_not_found(vault: &str, site: &str) -> GpamError {
    GpamError::SiteNotFound {
        vault: vault.to_string(),
        site: site.to_string(),
    }
}

/// Names are free-form but must not be blank.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GpamError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
