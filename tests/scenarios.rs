//! End-to-end scenarios and invariants from the literal S1-S6 walkthroughs, run against an
//! in-memory index with an explicit `flush()` barrier so background post-processing (reverse
//! map, counters, reclaim enqueue) is observable before assertions run.

use pathvault::{Config, Existence, FileType, NewFile, PathIndex};

/// Tests assert orphan visibility immediately after enqueueing (the literal S1-S6 walkthroughs
/// don't wait out a grace period), so the fixture disables it; `Config::default()`'s 24h grace
/// period is exercised separately in `config.rs`'s unit tests.
fn index() -> PathIndex {
    let mut config = Config::default();
    config.gc_grace_period_hours = 0;
    PathIndex::open_memory(config).unwrap()
}

fn file(fileid: &str, storage: &str, size: u64, checksum: Option<&str>, creation: i64) -> NewFile {
    NewFile {
        fileid: fileid.to_string(),
        filestorage: storage.to_string(),
        size,
        creation,
        expiration: None,
        checksum: checksum.map(str::to_string),
    }
}

#[test]
fn s1_basic_create_read() {
    let idx = index();
    idx.insert("fs1", "/a/b.txt", &file("F1", "st1", 5, Some("C1"), 100)).unwrap();
    idx.flush();

    assert_eq!(idx.exists("fs1", "/a/b.txt").unwrap(), Existence::File);
    assert_eq!(idx.exists("fs1", "/a").unwrap(), Existence::Dir);
    assert_eq!(idx.get_file_length("fs1", "/a/b.txt").unwrap(), 5);

    let counters = idx.get_filesystem("fs1").unwrap().unwrap();
    assert_eq!(counters.file_count, 1);
    assert_eq!(counters.size, 5);

    assert_eq!(
        idx.get_paths_by_file_id("F1").unwrap(),
        vec![("fs1".to_string(), "/a/b.txt".to_string())]
    );
}

#[test]
fn s2_dedup_reuses_canonical_blob_and_tombstones_the_duplicate() {
    let idx = index();
    idx.insert("fs1", "/a/b.txt", &file("F1", "st1", 5, Some("C1"), 100)).unwrap();
    idx.flush();

    idx.insert("fs2", "/x/y.txt", &file("F2", "st2", 5, Some("C1"), 200)).unwrap();
    idx.flush();

    let entry = idx.get_path_map("fs2", "/x/y.txt").unwrap().unwrap();
    assert_eq!(entry.fileid, Some("F1".to_string()));
    assert_eq!(entry.filestorage, Some("st1".to_string()));

    let counters = idx.get_filesystem("fs2").unwrap().unwrap();
    assert_eq!(counters.file_count, 1);
    assert_eq!(counters.size, 0);

    let orphans = idx.list_orphaned_files(None).unwrap();
    assert!(orphans.iter().any(|o| o.storage == "st2"));
}

#[test]
fn s3_delete_last_reference_clears_checksum_and_zeroes_counters() {
    let idx = index();
    idx.insert("fs1", "/a/b.txt", &file("F1", "st1", 5, Some("C1"), 100)).unwrap();
    idx.flush();
    idx.insert("fs2", "/x/y.txt", &file("F2", "st2", 5, Some("C1"), 200)).unwrap();
    idx.flush();

    assert!(idx.delete("fs2", "/x/y.txt", false).unwrap());
    idx.flush();
    assert!(idx.delete("fs1", "/a/b.txt", false).unwrap());
    idx.flush();

    assert_eq!(idx.get_file_checksum("fs1", "/a/b.txt").unwrap(), None);
    let orphans = idx.list_orphaned_files(None).unwrap();
    assert!(orphans.iter().any(|o| o.fileid == "F1" && o.storage == "st1"));

    let counters = idx.get_filesystem("fs1").unwrap().unwrap();
    assert_eq!(counters.file_count, 0);
    assert_eq!(counters.size, 0);
}

#[test]
fn s4_expired_entry_vanishes_on_read() {
    let idx = index();
    let mut f = file("F1", "st1", 5, Some("C1"), 100);
    f.expiration = Some(50);
    idx.insert("fs1", "/a.txt", &f).unwrap();
    idx.flush();

    assert_eq!(idx.get_storage_file("fs1", "/a.txt").unwrap(), None);
    idx.flush();
    assert!(idx.get_path_map("fs1", "/a.txt").unwrap().is_none());
}

#[test]
fn s5_non_empty_directory_requires_force_and_force_does_not_cascade() {
    let idx = index();
    idx.insert("fs1", "/d/f", &file("F1", "st1", 1, None, 1)).unwrap();
    idx.flush();

    assert!(!idx.delete("fs1", "/d", false).unwrap());
    assert!(idx.delete("fs1", "/d", true).unwrap());
    idx.flush();

    // the directory row is gone, but its child row is untouched (force does not cascade).
    assert!(idx.get_path_map("fs1", "/d/f").unwrap().is_some());
}

#[test]
fn s6_bounded_traversal_delivers_exactly_the_limit() {
    let idx = index();
    for i in 0..10 {
        idx.insert("fs1", &format!("/f{i}.txt"), &file(&format!("F{i}"), "st", 1, None, 1))
            .unwrap();
    }
    idx.flush();

    let mut seen = Vec::new();
    idx.traverse("fs1", "/", FileType::All, Some(3), |e| seen.push(e.path.clone()))
        .unwrap();
    assert_eq!(seen.len(), 3);
}

#[test]
fn invariant_exists_agrees_with_get_path_map() {
    let idx = index();
    assert_eq!(idx.exists("fs1", "/missing.txt").unwrap(), Existence::None);
    assert!(idx.get_path_map("fs1", "/missing.txt").unwrap().is_none());

    idx.insert("fs1", "/a.txt", &file("F1", "st1", 1, None, 1)).unwrap();
    idx.flush();
    assert_ne!(idx.exists("fs1", "/a.txt").unwrap(), Existence::None);
    assert!(idx.get_path_map("fs1", "/a.txt").unwrap().is_some());
}

#[test]
fn invariant_idempotent_delete() {
    let idx = index();
    idx.insert("fs1", "/a.txt", &file("F1", "st1", 1, None, 1)).unwrap();
    idx.flush();

    assert!(idx.delete("fs1", "/a.txt", false).unwrap());
    idx.flush();
    assert!(!idx.delete("fs1", "/a.txt", false).unwrap());
    assert!(idx.get_path_map("fs1", "/a.txt").unwrap().is_none());
}

#[test]
fn invariant_copy_preserves_fileid_and_storage() {
    let idx = index();
    idx.insert("fs1", "/a.txt", &file("F1", "st1", 7, Some("C1"), 1)).unwrap();
    idx.flush();

    assert!(idx.copy("fs1", "/a.txt", "/b.txt", None, None).unwrap());
    idx.flush();

    let src = idx.get_path_map("fs1", "/a.txt").unwrap().unwrap();
    let dst = idx.get_path_map("fs1", "/b.txt").unwrap().unwrap();
    assert_eq!(src.fileid, dst.fileid);
    assert_eq!(src.filestorage, dst.filestorage);
}

#[test]
fn invariant_make_dirs_is_idempotent_and_creates_every_ancestor() {
    let idx = index();
    idx.make_dirs("fs1", "/a/b/c/").unwrap();
    idx.make_dirs("fs1", "/a/b/c/").unwrap();

    assert_eq!(idx.exists("fs1", "/a/").unwrap(), Existence::Dir);
    assert_eq!(idx.exists("fs1", "/a/b/").unwrap(), Existence::Dir);
    assert_eq!(idx.exists("fs1", "/a/b/c/").unwrap(), Existence::Dir);
}

#[test]
fn invariant_orphan_detection_with_zero_grace_period() {
    let idx = index();
    idx.insert("fs1", "/a.txt", &file("F1", "st1", 1, Some("C1"), 1)).unwrap();
    idx.flush();
    idx.delete("fs1", "/a.txt", false).unwrap();
    idx.flush();

    let orphans = idx.list_orphaned_files(None).unwrap();
    assert!(orphans.iter().any(|o| o.fileid == "F1"));
}

#[test]
fn invariant_get_first_filesystem_containing_respects_caller_order() {
    let idx = index();
    idx.insert("fs2", "/shared.txt", &file("F1", "st1", 1, None, 1)).unwrap();
    idx.insert("fs3", "/shared.txt", &file("F2", "st2", 1, None, 1)).unwrap();
    idx.flush();

    let candidates = vec!["fs1".to_string(), "fs2".to_string(), "fs3".to_string()];
    assert_eq!(
        idx.get_first_filesystem_containing(&candidates, "/shared.txt").unwrap(),
        Some("fs2".to_string())
    );

    let reordered = vec!["fs3".to_string(), "fs2".to_string()];
    assert_eq!(
        idx.get_first_filesystem_containing(&reordered, "/shared.txt").unwrap(),
        Some("fs3".to_string())
    );
}
