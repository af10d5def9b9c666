//! Dedup + reverse-map + counter protocol (§4.4 Insert/Delete).
//!
//! Every insert and delete does a synchronous write to `pathmap` (the read path must see it
//! immediately) and defers the reverse-map/counter/reclaim bookkeeping to the background
//! [`Executor`]. Callers that need those effects visible (tests, `flush`-then-read code paths)
//! must call [`Executor::flush`] first.

use std::sync::Arc;

use anyhow::Result;
use log::warn;

use super::pathmap;
use crate::executor::Executor;
use crate::paths::{marshall, parent_path, random_file_id};
use crate::store::{self, Consistency, Session};
use crate::time::{hour_of_day, now_millis};
use crate::types::{NewFile, PathEntry, ReclaimEntry};

/// §4.4 Insert. `new_file` is the caller's candidate blob; on a checksum hit it is discarded in
/// favor of the already-stored blob and enqueued for reclaim instead.
pub fn insert(
    session: &Arc<Session>,
    executor: &Executor,
    fs: &str,
    path: &str,
    new_file: &NewFile,
) -> Result<()> {
    let Some(parent) = parent_path(path) else {
        anyhow::bail!("cannot insert at root");
    };

    {
        let session = Arc::clone(session);
        let parent = parent.clone();
        let fs = fs.to_string();
        executor.submit(move || {
            if let Err(e) = pathmap::make_dirs(&session, &fs, &parent) {
                warn!("background make_dirs failed for {fs}:{parent}: {e:#}");
            }
        });
    }

    // An existing row at this exact key must be a file (directories are never overwritten by
    // insert); delete it synchronously first so dedup bookkeeping below sees a clean slate.
    if let Some(existing) = pathmap::get_path_map(session, fs, path)? {
        if existing.is_directory() {
            anyhow::bail!("cannot insert file over existing directory at {path}");
        }
        delete_internal(session, executor, fs, path, &existing, true)?;
    }

    let (fileid, filestorage, duplicate) = match new_file.checksum.as_deref() {
        Some(checksum) => match store::checksum_get(session, checksum)? {
            Some((canonical_fileid, canonical_storage)) => {
                if canonical_storage != new_file.filestorage {
                    // caller's candidate blob is now orphaned; tombstone it under a synthetic id
                    // so the physical store can reclaim it without touching the canonical blob.
                    let tombstone = ReclaimEntry {
                        partition: hour_of_day(now_millis()),
                        deletion: now_millis(),
                        fileid: random_file_id(),
                        storage: new_file.filestorage.clone(),
                        checksum: None,
                    };
                    store::reclaim_enqueue(session, &tombstone)?;
                }
                (canonical_fileid, canonical_storage, true)
            }
            None => {
                store::checksum_save(session, checksum, &new_file.fileid, &new_file.filestorage)?;
                (new_file.fileid.clone(), new_file.filestorage.clone(), false)
            }
        },
        None => (new_file.fileid.clone(), new_file.filestorage.clone(), false),
    };

    let entry = PathEntry {
        fileid: Some(fileid.clone()),
        filestorage: Some(filestorage),
        size: new_file.size,
        creation: new_file.creation,
        expiration: new_file.expiration,
        checksum: new_file.checksum.clone(),
    };
    let (parent_key, name) = split_for_store(path)?;
    store::pathmap_upsert(session, fs, &parent_key, &name, &entry)?;

    let session = Arc::clone(session);
    let fs = fs.to_string();
    let path_key = marshall(fs.as_str(), path);
    // a duplicate reference contributes to fileCount but not to size, since size is only ever
    // attributed to the path that first inserted the blob (spec scenario S2).
    let size = if duplicate { 0 } else { new_file.size as i64 };
    executor.submit(move || {
        if let Err(e) = store::reversemap_add(&session, &fileid, &path_key) {
            warn!("background reversemap_add failed for {fileid}: {e:#}");
        }
        if let Err(e) = store::filesystem_increment(&session, &fs, 1, size) {
            warn!("background filesystem_increment failed for {fs}: {e:#}");
        }
    });

    Ok(())
}

fn split_for_store(path: &str) -> Result<(String, String)> {
    let parent = crate::paths::parent_path(path).ok_or_else(|| anyhow::anyhow!("path has no parent"))?;
    let name = crate::paths::filename(path).ok_or_else(|| anyhow::anyhow!("path has no filename"))?;
    Ok((parent, name))
}

/// §4.4 Delete. Idempotent: deleting a path that doesn't exist returns `Ok(false)`. A directory
/// delete requires `force` or emptiness. Returns whether a row was removed.
pub fn delete(
    session: &Arc<Session>,
    executor: &Executor,
    fs: &str,
    path: &str,
    force: bool,
) -> Result<bool> {
    let Some(entry) = pathmap::get_path_map(session, fs, path)? else {
        return Ok(false);
    };
    delete_internal(session, executor, fs, path, &entry, force)
}

fn delete_internal(
    session: &Arc<Session>,
    executor: &Executor,
    fs: &str,
    path: &str,
    entry: &PathEntry,
    force: bool,
) -> Result<bool> {
    if entry.is_directory() {
        if !force && !pathmap::is_empty_directory(session, fs, path)? {
            warn!("refusing to delete non-empty directory {fs}:{path} without force");
            return Ok(false);
        }
        let (parent, name) = split_for_store(path)?;
        store::pathmap_delete(session, fs, &parent, &name)?;
        return Ok(true);
    }

    let (parent, name) = split_for_store(path)?;
    store::pathmap_delete(session, fs, &parent, &name)?;

    let fileid = entry.fileid.clone().unwrap_or_default();
    let size = entry.size as i64;
    let checksum = entry.checksum.clone();
    let session = Arc::clone(session);
    let fs = fs.to_string();
    let path_key = marshall(fs.as_str(), path);
    let filestorage = entry.filestorage.clone().unwrap_or_default();
    executor.submit(move || {
        if let Err(e) = store::reversemap_remove(&session, &fileid, &path_key, Consistency::Quorum) {
            warn!("background reversemap_remove failed for {fileid}: {e:#}");
            return;
        }
        let remaining = match store::reversemap_count(&session, &fileid, Consistency::Quorum) {
            Ok(n) => n,
            Err(e) => {
                warn!("background reversemap_count failed for {fileid}: {e:#}");
                return;
            }
        };
        if remaining == 0 {
            if let Some(checksum) = &checksum {
                if let Err(e) = store::checksum_delete(&session, checksum) {
                    warn!("background checksum_delete failed for {checksum}: {e:#}");
                }
            }
            let tombstone = ReclaimEntry {
                partition: hour_of_day(now_millis()),
                deletion: now_millis(),
                fileid: fileid.clone(),
                storage: filestorage,
                checksum,
            };
            if let Err(e) = store::reclaim_enqueue(&session, &tombstone) {
                warn!("background reclaim_enqueue failed for {fileid}: {e:#}");
            }
            if let Err(e) = store::filesystem_increment(&session, &fs, -1, -size) {
                warn!("background filesystem_increment failed for {fs}: {e:#}");
            }
        } else if let Err(e) = store::filesystem_increment(&session, &fs, -1, 0) {
            warn!("background filesystem_increment failed for {fs}: {e:#}");
        }
    });

    Ok(true)
}
