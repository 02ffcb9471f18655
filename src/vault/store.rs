//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` wraps the XML format layer so the rest of the application
//! can work with simple calls like
//! `store.add_record("work", "example.com", "alice")`.
//!
//! Every call is independent: it loads the whole document, applies one
//! change, writes the whole document back, and drops it.  Nothing is cached
//! between calls.  Use [`VaultStore::transaction`] when several changes must
//! land together or not at all.
//!
//! Addressing: record positions are 1-based ordinals (what `add_record` and
//! `get_record_position` return).  Site and field positions are 0-based.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{GpamError, Result};

use super::format::{self, SKELETON};
use super::tree::{validate_name, VaultsDocument};

/// Handle to a vault file on disk.
#[derive(Debug, Clone)]
pub struct VaultStore {
    /// Path to the vault XML file.
    path: PathBuf,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault file at `path`, creating it (and its parent
    /// directories) if it does not exist.
    ///
    /// Fails with an access error if the file cannot be created or opened
    /// for writing.  The file may still be empty afterwards; call
    /// [`initialize`](Self::initialize) before the first operation.
    pub fn open(path: &Path) -> Result<Self> {
        let access = |source| GpamError::Access {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(access)?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(access)?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Write the empty document skeleton if the file is empty.  No-op otherwise.
    pub fn initialize(&self) -> Result<()> {
        let len = fs::metadata(&self.path)
            .map_err(|source| GpamError::Access {
                path: self.path.clone(),
                source,
            })?
            .len();
        if len > 0 {
            return Ok(());
        }

        debug!(path = %self.path.display(), "initializing empty vault file");
        format::write_atomic(&self.path, SKELETON.as_bytes())
            .map_err(|_| GpamError::Initialize(self.path.clone()))
    }

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ------------------------------------------------------------------
    // Load / save plumbing
    // ------------------------------------------------------------------

    /// Load the document and run a read-only query against it.
    fn read<T>(&self, query: impl FnOnce(&VaultsDocument) -> Result<T>) -> Result<T> {
        let doc = format::read_document(&self.path)?;
        query(&doc)
    }

    /// Load the document, apply `change`, and save only if it succeeded.
    ///
    /// This is the unit of atomicity: all mutations made by `change` are
    /// written with a single save, or none are.
    pub fn transaction<T>(
        &self,
        change: impl FnOnce(&mut VaultsDocument) -> Result<T>,
    ) -> Result<T> {
        let mut doc = format::read_document(&self.path)?;
        let result = change(&mut doc)?;
        format::write_document(&self.path, &doc)?;
        debug!(path = %self.path.display(), "vault file saved");
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Vaults
    // ------------------------------------------------------------------

    /// Add a vault.  Succeeds without changes if it already exists.
    pub fn add_vault(&self, vault: &str) -> Result<()> {
        validate_name("vault", vault)?;
        let existed = self.read(|doc| Ok(doc.vault(vault).is_some()))?;
        if existed {
            debug!(vault, "vault already exists");
            return Ok(());
        }
        self.transaction(|doc| doc.add_vault(vault).map(|_| ()))?;
        debug!(vault, "vault added");
        Ok(())
    }

    /// Make `vault` the only vault carrying the default marker.
    pub fn set_default_vault(&self, vault: &str) -> Result<()> {
        self.transaction(|doc| doc.set_default_vault(vault))?;
        debug!(vault, "default vault set");
        Ok(())
    }

    /// Name of the default vault, if one is set.
    pub fn get_default_vault(&self) -> Result<Option<String>> {
        self.read(|doc| Ok(doc.default_vault().map(|v| v.name.clone())))
    }

    /// Store the `master-key` attribute verbatim.
    pub fn set_master_key(&self, value: &str) -> Result<()> {
        self.transaction(|doc| {
            doc.master_key = value.to_string();
            Ok(())
        })
    }

    pub fn get_master_key(&self) -> Result<String> {
        self.read(|doc| Ok(doc.master_key.clone()))
    }

    // ------------------------------------------------------------------
    // Sites
    // ------------------------------------------------------------------

    /// Add a site to a vault.  Succeeds without changes if it already exists.
    pub fn add_site(&self, vault: &str, site: &str) -> Result<()> {
        validate_name("site", site)?;
        let existed = self.read(|doc| Ok(doc.require_vault(vault)?.site(site).is_some()))?;
        if existed {
            debug!(vault, site, "site already exists");
            return Ok(());
        }
        self.transaction(|doc| doc.require_vault_mut(vault)?.add_site(site).map(|_| ()))?;
        debug!(vault, site, "site added");
        Ok(())
    }

    pub fn is_site_exists(&self, vault: &str, site: &str) -> Result<bool> {
        self.read(|doc| Ok(doc.vault(vault).and_then(|v| v.site(site)).is_some()))
    }

    /// Rename a site in place.
    pub fn set_site_name(&self, vault: &str, site: &str, new_name: &str) -> Result<()> {
        self.transaction(|doc| rename_site(doc, vault, site, new_name))?;
        debug!(vault, site, new_name, "site renamed");
        Ok(())
    }

    /// Remove a site together with all of its records.
    pub fn delete_site(&self, vault: &str, site: &str) -> Result<()> {
        self.transaction(|doc| {
            if doc.require_vault_mut(vault)?.remove_site(site) {
                Ok(())
            } else {
                Err(GpamError::SiteNotFound {
                    vault: vault.to_string(),
                    site: site.to_string(),
                })
            }
        })?;
        debug!(vault, site, "site deleted");
        Ok(())
    }

    pub fn get_sites_count(&self, vault: &str) -> Result<usize> {
        self.read(|doc| Ok(doc.require_vault(vault)?.sites.len()))
    }

    /// Name of the site at a 0-based position.
    pub fn get_site_name(&self, vault: &str, position: usize) -> Result<Option<String>> {
        self.read(|doc| {
            Ok(doc
                .require_vault(vault)?
                .sites
                .get(position)
                .map(|s| s.name.clone()))
        })
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Find or create the record for `login` and return its 1-based position.
    ///
    /// An existing record is returned untouched.  A new record is appended
    /// empty; the caller adds its fields (including `login`) afterwards.
    pub fn add_record(&self, vault: &str, site: &str, login: &str) -> Result<usize> {
        let existing = self.get_record_position(vault, site, login)?;
        if let Some(position) = existing {
            debug!(vault, site, position, "record already exists");
            return Ok(position);
        }

        let position = self.transaction(|doc| {
            let site_node = doc.require_site_mut(vault, site)?;
            site_node.records.push(Default::default());
            Ok(site_node.records.len())
        })?;
        debug!(vault, site, position, "record added");
        Ok(position)
    }

    /// Set a field on the record at `position`, overwriting the first field
    /// with the same name or appending a new one.
    pub fn add_record_field(
        &self,
        vault: &str,
        site: &str,
        position: usize,
        name: &str,
        value: &str,
    ) -> Result<()> {
        let appended = self.transaction(|doc| {
            doc.require_record_mut(vault, site, position)?
                .upsert_field(name, value)
        })?;
        debug!(vault, site, position, field = name, appended, "record field set");
        Ok(())
    }

    /// Remove the record at `position`.  Later records move up by one.
    pub fn delete_record(&self, vault: &str, site: &str, position: usize) -> Result<()> {
        self.transaction(|doc| {
            doc.require_site_mut(vault, site)?
                .remove_record(position)
                .map(|_| ())
                .ok_or_else(|| GpamError::RecordNotFound {
                    site: site.to_string(),
                    position,
                })
        })?;
        debug!(vault, site, position, "record deleted");
        Ok(())
    }

    /// 1-based position of the first record whose login matches.
    pub fn get_record_position(
        &self,
        vault: &str,
        site: &str,
        login: &str,
    ) -> Result<Option<usize>> {
        self.read(|doc| Ok(doc.require_site(vault, site)?.record_position(login)))
    }

    /// Number of fields on the record matched by `login`.
    pub fn get_record_fields_count(&self, vault: &str, site: &str, login: &str) -> Result<usize> {
        self.read(|doc| {
            let site_node = doc.require_site(vault, site)?;
            site_node
                .record_position(login)
                .and_then(|position| site_node.record(position))
                .map(|record| record.fields.len())
                .ok_or_else(|| GpamError::LoginNotFound {
                    site: site.to_string(),
                    login: login.to_string(),
                })
        })
    }

    /// Name of the field at (1-based record position, 0-based field position).
    pub fn get_record_field_name(
        &self,
        vault: &str,
        site: &str,
        position: usize,
        field: usize,
    ) -> Result<Option<String>> {
        self.read(|doc| {
            Ok(doc
                .require_site(vault, site)?
                .record(position)
                .and_then(|r| r.field_at(field))
                .map(|f| f.name.clone()))
        })
    }

    /// Value of the field at (1-based record position, 0-based field position).
    pub fn get_record_field_value(
        &self,
        vault: &str,
        site: &str,
        position: usize,
        field: usize,
    ) -> Result<Option<String>> {
        self.read(|doc| {
            Ok(doc
                .require_site(vault, site)?
                .record(position)
                .and_then(|r| r.field_at(field))
                .map(|f| f.value.clone()))
        })
    }
}

/// Rename `site` to `new_name` inside `vault`.
///
/// Renaming onto an existing sibling would break name uniqueness, so it is
/// rejected; renaming a site to its own name is a no-op.
pub fn rename_site(doc: &mut VaultsDocument, vault: &str, site: &str, new_name: &str) -> Result<()> {
    validate_name("site", new_name)?;
    let vault_node = doc.require_vault_mut(vault)?;
    if site != new_name && vault_node.site(new_name).is_some() {
        return Err(GpamError::CommandFailed(format!(
            "site '{new_name}' already exists in vault '{vault}'"
        )));
    }
    let site_node = vault_node
        .site_mut(site)
        .ok_or_else(|| GpamError::SiteNotFound {
            vault: vault.to_string(),
            site: site.to_string(),
        })?;
    site_node.name = new_name.to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, VaultStore) {
        let dir = TempDir::new().unwrap();
        let store = VaultStore::open(&dir.path().join("vaults.xml")).unwrap();
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_missing_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/vaults.xml");
        let store = VaultStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn initialize_writes_skeleton_once() {
        let (_dir, store) = store();
        let first = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, SKELETON);

        store.add_vault("work").unwrap();
        store.initialize().unwrap();
        assert!(store.get_default_vault().unwrap().is_none());
        assert_eq!(store.get_sites_count("work").unwrap(), 0);
    }

    #[test]
    fn operations_on_uninitialized_file_fail() {
        let dir = TempDir::new().unwrap();
        let store = VaultStore::open(&dir.path().join("vaults.xml")).unwrap();
        assert!(matches!(
            store.add_vault("work"),
            Err(GpamError::InvalidDocument(_))
        ));
    }

    #[test]
    fn failed_transaction_saves_nothing() {
        let (_dir, store) = store();
        store.add_vault("work").unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let result: Result<()> = store.transaction(|doc| {
            doc.add_vault("other")?;
            doc.set_default_vault("ghost")
        });
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn rename_site_rejects_collision() {
        let (_dir, store) = store();
        store.add_vault("v").unwrap();
        store.add_site("v", "a").unwrap();
        store.add_site("v", "b").unwrap();
        assert!(store.set_site_name("v", "a", "b").is_err());
        store.set_site_name("v", "a", "a").unwrap();
        assert!(store.is_site_exists("v", "a").unwrap());
    }

    #[test]
    fn master_key_is_stored_verbatim() {
        let (_dir, store) = store();
        assert_eq!(store.get_master_key().unwrap(), "");
        store.set_master_key("s3cr\"t").unwrap();
        assert_eq!(store.get_master_key().unwrap(), "s3cr\"t");
    }
}
