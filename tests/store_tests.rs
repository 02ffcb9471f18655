//! Integration tests for the GPAM vault store.

use std::fs;

use gpam::errors::GpamError;
use gpam::vault::VaultStore;
use tempfile::TempDir;

/// Helper: an initialized vault file inside a fresh temp dir.
fn new_store() -> (TempDir, VaultStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = VaultStore::open(&dir.path().join("vaults.xml")).expect("open store");
    store.initialize().expect("initialize");
    (dir, store)
}

/// Helper: store with vault "work" (default) and site "example.com".
fn populated_store() -> (TempDir, VaultStore) {
    let (dir, store) = new_store();
    store.add_vault("work").unwrap();
    store.set_default_vault("work").unwrap();
    store.add_site("work", "example.com").unwrap();
    (dir, store)
}

/// Helper: add a record and give it a login field, the way the CLI does.
fn add_login(store: &VaultStore, login: &str) -> usize {
    let position = store.add_record("work", "example.com", login).unwrap();
    store
        .add_record_field("work", "example.com", position, "login", login)
        .unwrap();
    position
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_vault_site_record_field() {
    let (_dir, store) = new_store();

    store.add_vault("work").unwrap();
    store.set_default_vault("work").unwrap();
    store.add_site("work", "example.com").unwrap();

    let position = store.add_record("work", "example.com", "alice").unwrap();
    assert_eq!(position, 1);

    store
        .add_record_field("work", "example.com", 1, "password", "hunter2")
        .unwrap();

    let value = store
        .get_record_field_value("work", "example.com", 1, 0)
        .unwrap();
    assert_eq!(value.as_deref(), Some("hunter2"));

    let name = store
        .get_record_field_name("work", "example.com", 1, 0)
        .unwrap();
    assert_eq!(name.as_deref(), Some("password"));
}

#[test]
fn changes_survive_reopening() {
    let (dir, store) = populated_store();
    add_login(&store, "alice");
    drop(store);

    let reopened = VaultStore::open(&dir.path().join("vaults.xml")).unwrap();
    reopened.initialize().unwrap();
    assert_eq!(reopened.get_default_vault().unwrap().as_deref(), Some("work"));
    assert_eq!(
        reopened
            .get_record_position("work", "example.com", "alice")
            .unwrap(),
        Some(1)
    );
}

// ---------------------------------------------------------------------------
// Default vault
// ---------------------------------------------------------------------------

#[test]
fn exactly_one_default_vault() {
    let (_dir, store) = new_store();
    for name in ["a", "b", "c"] {
        store.add_vault(name).unwrap();
    }

    for name in ["a", "c", "b", "b"] {
        store.set_default_vault(name).unwrap();
        let xml = fs::read_to_string(store.path()).unwrap();
        assert_eq!(xml.matches("default=\"yes\"").count(), 1);
        assert_eq!(store.get_default_vault().unwrap().as_deref(), Some(name));
    }
}

#[test]
fn set_default_to_missing_vault_changes_nothing() {
    let (_dir, store) = new_store();
    store.add_vault("a").unwrap();
    store.set_default_vault("a").unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let err = store.set_default_vault("ghost").unwrap_err();
    assert!(matches!(err, GpamError::VaultNotFound(_)));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn fresh_vault_has_no_default() {
    let (_dir, store) = new_store();
    store.add_vault("a").unwrap();
    assert!(store.get_default_vault().unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Vaults and sites
// ---------------------------------------------------------------------------

#[test]
fn add_vault_and_site_are_idempotent() {
    let (_dir, store) = new_store();
    store.add_vault("work").unwrap();
    store.add_vault("work").unwrap();
    store.add_site("work", "example.com").unwrap();
    store.add_site("work", "example.com").unwrap();

    let xml = fs::read_to_string(store.path()).unwrap();
    assert_eq!(xml.matches("<vault ").count(), 1);
    assert_eq!(store.get_sites_count("work").unwrap(), 1);
}

#[test]
fn add_site_to_missing_vault_fails() {
    let (_dir, store) = new_store();
    let err = store.add_site("ghost", "example.com").unwrap_err();
    assert!(matches!(err, GpamError::VaultNotFound(_)));
}

#[test]
fn site_names_are_zero_based() {
    let (_dir, store) = populated_store();
    store.add_site("work", "second.org").unwrap();

    assert_eq!(store.get_sites_count("work").unwrap(), 2);
    assert_eq!(
        store.get_site_name("work", 0).unwrap().as_deref(),
        Some("example.com")
    );
    assert_eq!(
        store.get_site_name("work", 1).unwrap().as_deref(),
        Some("second.org")
    );
    assert!(store.get_site_name("work", 2).unwrap().is_none());
}

#[test]
fn rename_and_delete_site() {
    let (_dir, store) = populated_store();
    add_login(&store, "alice");

    store
        .set_site_name("work", "example.com", "example.org")
        .unwrap();
    assert!(!store.is_site_exists("work", "example.com").unwrap());
    assert_eq!(
        store
            .get_record_position("work", "example.org", "alice")
            .unwrap(),
        Some(1)
    );

    store.delete_site("work", "example.org").unwrap();
    assert!(!store.is_site_exists("work", "example.org").unwrap());
    assert_eq!(store.get_sites_count("work").unwrap(), 0);
}

#[test]
fn rename_or_delete_missing_site_fails() {
    let (_dir, store) = populated_store();
    assert!(matches!(
        store.set_site_name("work", "ghost", "x"),
        Err(GpamError::SiteNotFound { .. })
    ));
    assert!(matches!(
        store.delete_site("work", "ghost"),
        Err(GpamError::SiteNotFound { .. })
    ));
}

#[test]
fn is_site_exists_tolerates_missing_vault() {
    let (_dir, store) = new_store();
    assert!(!store.is_site_exists("ghost", "example.com").unwrap());
}

// ---------------------------------------------------------------------------
// Records and fields
// ---------------------------------------------------------------------------

#[test]
fn add_record_is_idempotent_by_login() {
    let (_dir, store) = populated_store();
    let first = add_login(&store, "alice");
    let again = store.add_record("work", "example.com", "alice").unwrap();
    assert_eq!(first, again);

    let xml = fs::read_to_string(store.path()).unwrap();
    assert_eq!(xml.matches("<record>").count(), 1);
}

#[test]
fn record_position_is_that_of_the_match() {
    let (_dir, store) = populated_store();
    for login in ["a", "b", "c"] {
        add_login(&store, login);
    }

    assert_eq!(
        store.get_record_position("work", "example.com", "a").unwrap(),
        Some(1)
    );
    assert_eq!(
        store.get_record_position("work", "example.com", "b").unwrap(),
        Some(2)
    );
    assert_eq!(store.add_record("work", "example.com", "b").unwrap(), 2);
    assert!(store
        .get_record_position("work", "example.com", "zzz")
        .unwrap()
        .is_none());
}

#[test]
fn add_record_on_missing_site_fails() {
    let (_dir, store) = populated_store();
    let err = store.add_record("work", "ghost", "alice").unwrap_err();
    assert!(matches!(err, GpamError::SiteNotFound { .. }));
}

#[test]
fn add_record_field_upserts() {
    let (_dir, store) = populated_store();
    let position = add_login(&store, "alice");

    store
        .add_record_field("work", "example.com", position, "password", "first")
        .unwrap();
    store
        .add_record_field("work", "example.com", position, "password", "second")
        .unwrap();

    assert_eq!(
        store
            .get_record_fields_count("work", "example.com", "alice")
            .unwrap(),
        2
    );
    assert_eq!(
        store
            .get_record_field_value("work", "example.com", position, 1)
            .unwrap()
            .as_deref(),
        Some("second")
    );
}

#[test]
fn add_record_field_at_missing_position_fails() {
    let (_dir, store) = populated_store();
    add_login(&store, "alice");
    for position in [0, 2] {
        let err = store
            .add_record_field("work", "example.com", position, "x", "y")
            .unwrap_err();
        assert!(matches!(err, GpamError::RecordNotFound { .. }));
    }
}

#[test]
fn delete_record_shifts_later_positions() {
    let (_dir, store) = populated_store();
    for login in ["a", "b", "c"] {
        add_login(&store, login);
    }

    store.delete_record("work", "example.com", 2).unwrap();

    assert!(store
        .get_record_position("work", "example.com", "b")
        .unwrap()
        .is_none());
    assert_eq!(
        store.get_record_position("work", "example.com", "c").unwrap(),
        Some(2)
    );
    assert!(store.delete_record("work", "example.com", 3).is_err());
}

#[test]
fn fields_count_for_unknown_login_fails() {
    let (_dir, store) = populated_store();
    let err = store
        .get_record_fields_count("work", "example.com", "nobody")
        .unwrap_err();
    assert!(matches!(err, GpamError::LoginNotFound { .. }));
}

#[test]
fn field_lookups_out_of_range_are_none() {
    let (_dir, store) = populated_store();
    let position = add_login(&store, "alice");
    assert!(store
        .get_record_field_name("work", "example.com", position, 5)
        .unwrap()
        .is_none());
    assert!(store
        .get_record_field_value("work", "example.com", 9, 0)
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Hostile names
// ---------------------------------------------------------------------------

#[test]
fn quotes_in_names_and_values_are_plain_data() {
    let (_dir, store) = new_store();
    let vault = "it's \"mine\"";
    let site = "a' or '1'='1";
    store.add_vault(vault).unwrap();
    store.add_site(vault, site).unwrap();
    store.add_site(vault, "other").unwrap();

    let position = store.add_record(vault, site, "x'y").unwrap();
    store
        .add_record_field(vault, site, position, "login", "x'y")
        .unwrap();
    store
        .add_record_field(vault, site, position, "note", "<b>&amp;</b>")
        .unwrap();

    assert!(store.is_site_exists(vault, site).unwrap());
    assert!(!store.is_site_exists(vault, "a").unwrap());
    assert_eq!(store.get_record_position(vault, site, "x'y").unwrap(), Some(1));
    assert_eq!(
        store
            .get_record_field_value(vault, site, 1, 1)
            .unwrap()
            .as_deref(),
        Some("<b>&amp;</b>")
    );

    store.delete_site(vault, site).unwrap();
    assert_eq!(store.get_sites_count(vault).unwrap(), 1);
}

#[test]
fn blank_names_are_rejected() {
    let (_dir, store) = populated_store();
    assert!(matches!(
        store.add_vault("  "),
        Err(GpamError::InvalidName { .. })
    ));
    assert!(store.add_site("work", "").is_err());
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vaults.xml");
    fs::write(&path, "<vaults><vault name=\"a\"></vaults>").unwrap();

    let store = VaultStore::open(&path).unwrap();
    store.initialize().unwrap();
    let err = store.get_default_vault().unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
