//! Integration tests for `ConfigManager` against real JSON and TOML files.
//!
//! Every scenario runs once per file backend, in its own scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use configri::{
    BackendKind, ConfigManager, Mapping, ManagerError, MemoryBackend, MemoryFile, ReloadOptions,
    Value,
};
use serde_json::json;
use uuid::Uuid;

/// Scratch directory removed on drop.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("configri_it_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        Self { dir }
    }

    fn file(&self, kind: BackendKind) -> PathBuf {
        self.dir.join(format!("config.{kind}"))
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

fn mapping(value: Value) -> Mapping {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn base_defaults() -> Mapping {
    mapping(json!({ "name": "BaseConfig", "version": 13, "use_always": true }))
}

fn open(path: &Path, kind: BackendKind, defaults: Option<Mapping>) -> ConfigManager {
    ConfigManager::new(path, kind.name(), defaults).expect("manager must open")
}

#[test]
fn test_end_to_end_set_save_reload() {
    for kind in BackendKind::ALL {
        // Arrange
        let scratch = Scratch::new();
        let path = scratch.file(kind);
        let mut cfg = open(&path, kind, Some(mapping(json!({ "a": 1 }))));
        assert_eq!(cfg.get("a").unwrap(), &json!(1), "{kind}");

        // Act
        cfg.set("b", 2);
        assert!(cfg.is_dirty(), "{kind}");
        assert_eq!(cfg.get("b").unwrap(), &json!(2), "{kind}");
        cfg.save().unwrap();

        // Assert
        assert!(!cfg.is_dirty(), "{kind}");
        cfg.reload(ReloadOptions::new().from_disk()).unwrap();
        assert_eq!(cfg.data(), &mapping(json!({ "a": 1, "b": 2 })), "{kind}");

        // A second manager over the same file sees the saved data
        let fresh = open(&path, kind, None);
        assert_eq!(fresh.data(), &mapping(json!({ "a": 1, "b": 2 })), "{kind}");
    }
}

#[test]
fn test_typed_getters_on_prepopulated_file() {
    for kind in BackendKind::ALL {
        let scratch = Scratch::new();
        let cfg = open(&scratch.file(kind), kind, Some(base_defaults()));

        assert_eq!(cfg.get_int("version", None).unwrap(), 13, "{kind}");
        assert!(
            matches!(cfg.get_int("name", None), Err(ManagerError::TypeCast { .. })),
            "{kind}"
        );
        assert_eq!(cfg.get_int("name", Some(7)).unwrap(), 7, "{kind}");
        assert_eq!(cfg.get_float("version", None).unwrap(), 13.0, "{kind}");
        assert!(cfg.get_float("name", None).is_err(), "{kind}");
        assert!(cfg.get_bool("use_always", None).unwrap(), "{kind}");
        assert!(cfg.get_bool("name", None).unwrap(), "{kind}");
    }
}

#[test]
fn test_clear_changes_and_reload_both_discard_unsaved_edits() {
    for kind in BackendKind::ALL {
        for use_reload in [false, true] {
            // Arrange – start from an empty file, as a freshly truncated config
            let scratch = Scratch::new();
            let path = scratch.file(kind);
            fs::write(&path, "").unwrap();
            let mut cfg = open(&path, kind, None);
            let key = format!("k_{}", Uuid::new_v4().simple());

            cfg.set(key.as_str(), json!([1, 2, 3, 5, 7, 9, 11, 13, 17]));
            assert!(!cfg.persisted().contains_key(&key));
            assert!(cfg.staged().contains_key(&key));
            assert!(cfg.is_dirty());

            // Act
            if use_reload {
                cfg.reload(ReloadOptions::new()).unwrap();
            } else {
                cfg.clear_changes();
            }

            // Assert
            assert_eq!(cfg.get_or(&key, false), json!(false), "{kind}");
            assert!(!cfg.is_dirty(), "{kind}");
        }
    }
}

#[test]
fn test_saved_changes_survive_clear() {
    for kind in BackendKind::ALL {
        let scratch = Scratch::new();
        let mut cfg = open(&scratch.file(kind), kind, None);

        cfg.set("big", 86_681_492_395_i64);
        cfg.save().unwrap();
        cfg.clear_changes();

        assert!(!cfg.is_dirty(), "{kind}");
        assert!(cfg.persisted().contains_key("big"), "{kind}");
        assert!(!cfg.staged().contains_key("big"), "{kind}");
        assert_eq!(cfg.get("big").unwrap(), &json!(86_681_492_395_i64), "{kind}");
    }
}

#[test]
fn test_save_twice_writes_identical_content() {
    for kind in BackendKind::ALL {
        let scratch = Scratch::new();
        let path = scratch.file(kind);
        let mut cfg = open(&path, kind, Some(base_defaults()));
        cfg.set("extra", "value");

        cfg.save().unwrap();
        let first = fs::read_to_string(&path).unwrap();
        cfg.save().unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second, "{kind}");
        assert!(!cfg.is_dirty(), "{kind}");
    }
}

#[test]
fn test_update_then_save_preserves_key_order() {
    for kind in BackendKind::ALL {
        let scratch = Scratch::new();
        let path = scratch.file(kind);
        let mut cfg = open(&path, kind, Some(base_defaults()));

        cfg.update([
            &mapping(json!({ "zeta": 1, "version": 14 })),
            &mapping(json!({ "alpha": 2 })),
        ]);
        cfg.save().unwrap();

        let reopened = open(&path, kind, None);
        let keys: Vec<&str> = reopened.data().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["name", "version", "use_always", "zeta", "alpha"],
            "{kind}"
        );
        assert_eq!(reopened.get_int("version", None).unwrap(), 14, "{kind}");
    }
}

#[test]
fn test_malformed_file_is_replaced_by_defaults_on_open() {
    for kind in BackendKind::ALL {
        let scratch = Scratch::new();
        let path = scratch.file(kind);
        fs::write(&path, "{{{{ [[[ definitely not valid").unwrap();

        let cfg = open(&path, kind, Some(base_defaults()));

        assert_eq!(cfg.data(), &base_defaults(), "{kind}");
        let reopened = open(&path, kind, None);
        assert_eq!(reopened.data(), &base_defaults(), "{kind}");
    }
}

#[test]
fn test_directory_as_source_fails_construction() {
    for kind in BackendKind::ALL {
        let scratch = Scratch::new();

        let result = ConfigManager::new(&scratch.dir, kind.name(), Some(base_defaults()));

        assert!(
            matches!(result, Err(ManagerError::Backend(ref e)) if !e.is_recoverable()),
            "{kind}: {result:?}"
        );
    }
}

#[test]
fn test_repointed_backend_reads_new_file_after_reload() {
    // Arrange
    let scratch = Scratch::new();
    let first = scratch.dir.join("first.json");
    let second = scratch.dir.join("second.json");
    fs::write(&second, r#"{ "which": "second" }"#).unwrap();
    let mut cfg = open(&first, BackendKind::Json, Some(mapping(json!({ "which": "first" }))));

    // Act
    cfg.backend_mut().set_source(second.clone());
    cfg.reload(ReloadOptions::new().from_disk()).unwrap();

    // Assert
    assert_eq!(cfg.get("which").unwrap(), &json!("second"));
    assert_eq!(cfg.backend().source(), second.as_path());
}

#[test]
fn test_in_memory_backend_is_usable_from_the_public_api() {
    // Arrange
    let file = MemoryBackend::with_file(MemoryFile::Missing);
    let mut cfg =
        ConfigManager::with_backend(Box::new(file.clone()), Some(base_defaults())).unwrap();

    // Act
    cfg.set("extra", true);
    cfg.save().unwrap();

    // Assert
    let MemoryFile::Present(saved) = file.file() else {
        panic!("save must leave a present file");
    };
    assert_eq!(saved["extra"], json!(true));
    assert_eq!(saved["version"], json!(13));
}
