//! Pure-function tests: path utilities, configuration, and time helpers. No database touched
//! here; see `tests/db_tests.rs` for anything that goes through a `Session`.

use pathvault::paths::{
    filename, is_valid_filesystem, marshall, normalize, normalize_parent_path, parent_path,
    parents_bottom_up, random_file_id, unmarshall,
};
use pathvault::time::hour_of_day;
use pathvault::Config;

// --- paths::normalize ---

#[test]
fn normalize_collapses_duplicate_slashes() {
    assert_eq!(normalize("/a//b/", "//c.txt"), "/a/b/c.txt");
    assert_eq!(normalize("/", "a.txt"), "/a.txt");
}

// --- paths::parent_path ---

#[test]
fn parent_path_of_top_level_is_root() {
    assert_eq!(parent_path("/a.txt"), Some("/".to_string()));
    assert_eq!(parent_path("/"), None);
}

#[test]
fn parent_path_nested() {
    assert_eq!(parent_path("/a/b/c.txt"), Some("/a/b/".to_string()));
    assert_eq!(parent_path("/a/b/"), Some("/a/".to_string()));
}

// --- paths::filename ---

#[test]
fn filename_file_vs_dir() {
    assert_eq!(filename("/a/b/c.txt"), Some("c.txt".to_string()));
    assert_eq!(filename("/a/b/"), Some("b/".to_string()));
    assert_eq!(filename("/"), None);
}

// --- paths::normalize_parent_path ---

#[test]
fn normalize_parent_path_adds_trailing_slash() {
    assert_eq!(normalize_parent_path("/a/b"), "/a/b/");
    assert_eq!(normalize_parent_path("/a/b/"), "/a/b/");
}

// --- paths::marshall / unmarshall ---

#[test]
fn marshall_round_trips() {
    let m = marshall("fs1", "/a/b.txt");
    assert_eq!(m, "fs1:/a/b.txt");
    assert_eq!(
        unmarshall(&m),
        Some(("fs1".to_string(), "/a/b.txt".to_string()))
    );
}

// --- paths::is_valid_filesystem ---

#[test]
fn is_valid_filesystem_rejects_empty_and_colon() {
    assert!(is_valid_filesystem("fs1"));
    assert!(!is_valid_filesystem(""));
    assert!(!is_valid_filesystem("fs:1"));
}

// --- paths::parents_bottom_up ---

#[test]
fn parents_bottom_up_orders_nearest_first() {
    assert_eq!(
        parents_bottom_up("/a/b/c.txt"),
        vec!["/a/b/".to_string(), "/a/".to_string()]
    );
    assert_eq!(parents_bottom_up("/a.txt"), Vec::<String>::new());
}

// --- paths::random_file_id ---

#[test]
fn random_file_id_is_hex_and_shardable() {
    let id = random_file_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    let _shard_prefix = &id[..4];
}

// --- Config ---

#[test]
fn default_grace_period_is_positive_hours_in_ms() {
    let cfg = Config::default();
    assert_eq!(cfg.gc_grace_period_ms(), 24 * 3_600_000);
}

#[test]
fn non_positive_grace_period_disables_delay() {
    let mut cfg = Config::default();
    cfg.gc_grace_period_hours = 0;
    assert_eq!(cfg.gc_grace_period_ms(), 0);
    cfg.gc_grace_period_hours = -5;
    assert_eq!(cfg.gc_grace_period_ms(), 0);
}

// --- time::hour_of_day ---

#[test]
fn hour_of_day_wraps_into_0_23() {
    assert_eq!(hour_of_day(0), 0);
    assert_eq!(hour_of_day(3_600_000), 1);
    assert_eq!(hour_of_day(23 * 3_600_000), 23);
    assert_eq!(hour_of_day(24 * 3_600_000), 0);
}
