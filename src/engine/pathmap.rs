//! Path map engine (§4.3): exists/list/traverse/makeDirs/expire over the pathmap table.

use anyhow::{Context, Result};

use crate::paths::{filename, normalize_parent_path, parent_path, parents_bottom_up};
use crate::store::{self, Consistency, Session};
use crate::time::now_millis;
use crate::types::{Existence, FileType, ListedEntry, PathEntry};

fn split(path: &str) -> Result<(String, String)> {
    let parent = parent_path(path).context("path has no parent (is it root?)")?;
    let name = filename(path).context("path has no filename component")?;
    Ok((parent, name))
}

/// §4.3 `exists`. Root always returns [`Existence::Dir`].
pub fn exists(session: &Session, fs: &str, path: &str) -> Result<Existence> {
    if path == "/" {
        return Ok(Existence::Dir);
    }
    let (parent, name) = split(path)?;
    let candidates = if path.ends_with('/') {
        vec![name]
    } else {
        vec![name.clone(), format!("{name}/")]
    };
    let matched = store::pathmap_exists_any(session, fs, &parent, &candidates, Consistency::Quorum)?;
    Ok(match matched {
        None => Existence::None,
        Some(m) if m.ends_with('/') => Existence::Dir,
        Some(_) => Existence::File,
    })
}

/// §4.3 `existsFile`: strict count query, true iff a row with exactly this filename exists.
pub fn exists_file(session: &Session, fs: &str, path: &str) -> Result<bool> {
    if path == "/" || path.ends_with('/') {
        return Ok(false);
    }
    let (parent, name) = split(path)?;
    let count = store::pathmap_exists_file_count(session, fs, &parent, &name, Consistency::Quorum)?;
    Ok(count > 0)
}

pub fn is_directory(session: &Session, fs: &str, path: &str) -> Result<bool> {
    Ok(exists(session, fs, path)? == Existence::Dir)
}

pub fn is_file(session: &Session, fs: &str, path: &str) -> Result<bool> {
    Ok(exists(session, fs, path)? == Existence::File)
}

/// Point read by primary key. No expiration check (see [`crate::PathIndex::get_storage_file`]
/// for the lazy-expiry read path).
pub fn get_path_map(session: &Session, fs: &str, path: &str) -> Result<Option<PathEntry>> {
    if path == "/" {
        return Ok(None);
    }
    let Ok((parent, name)) = split(path) else {
        return Ok(None);
    };
    store::pathmap_get(session, fs, &parent, &name)
}

/// -1 if missing, else the stored `size`.
pub fn get_file_length(session: &Session, fs: &str, path: &str) -> Result<i64> {
    Ok(get_path_map(session, fs, path)?
        .map(|e| e.size as i64)
        .unwrap_or(-1))
}

/// -1 if missing, else `creation` in epoch millis.
pub fn get_file_last_modified(session: &Session, fs: &str, path: &str) -> Result<i64> {
    Ok(get_path_map(session, fs, path)?
        .map(|e| e.creation)
        .unwrap_or(-1))
}

/// §4.3 `expire`: update-by-primary-key. Returns whether a row existed to update.
pub fn expire(session: &Session, fs: &str, path: &str, expiration: Option<i64>) -> Result<bool> {
    let (parent, name) = split(path)?;
    if store::pathmap_get(session, fs, &parent, &name)?.is_none() {
        return Ok(false);
    }
    store::pathmap_set_expiration(session, fs, &parent, &name, expiration)?;
    Ok(true)
}

/// §4.3 `makeDirs`: create every ancestor directory of `dir_path` not already present, far-most
/// ancestor first. Idempotent and safe under concurrent calls (re-inserting an identical
/// directory marker is harmless).
pub fn make_dirs(session: &Session, fs: &str, dir_path: &str) -> Result<()> {
    if dir_path == "/" {
        return Ok(());
    }
    let normalized = normalize_parent_path(dir_path);
    let mut to_create = vec![normalized.clone()];
    to_create.extend(parents_bottom_up(&normalized));
    to_create.reverse(); // root-most ancestor first

    for dir in to_create {
        let (parent, name) = split(&dir)?;
        if store::pathmap_get(session, fs, &parent, &name)?.is_none() {
            let entry = PathEntry {
                fileid: None,
                filestorage: None,
                size: 0,
                creation: now_millis(),
                expiration: None,
                checksum: None,
            };
            store::pathmap_upsert(session, fs, &parent, &name, &entry)?;
        }
    }
    Ok(())
}

/// §4.3 `list` (non-recursive): children of `path`, filtered by `file_type`.
pub fn list(session: &Session, fs: &str, path: &str, file_type: FileType) -> Result<Vec<ListedEntry>> {
    let normalized = normalize_parent_path(path);
    let children = store::pathmap_list_children(session, fs, &normalized)?;
    Ok(children
        .into_iter()
        .filter(|(name, _)| file_type.matches(name))
        .map(|(name, entry)| ListedEntry {
            path: format!("{normalized}{name}"),
            entry,
        })
        .collect())
}

/// `count > 0` check used by directory deletion's emptiness probe.
pub fn is_empty_directory(session: &Session, fs: &str, path: &str) -> Result<bool> {
    let normalized = normalize_parent_path(path);
    Ok(store::pathmap_count_children(session, fs, &normalized)? == 0)
}

/// §4.3 `traverse`: explicit-stack pre-order depth-first walk rooted at `start_path` (or the
/// synthetic root sentinel when `start_path == "/"`). `limit` (if `Some`) stops emission after
/// that many matching entries; a missing non-root root entry is a no-op.
pub fn traverse(
    session: &Session,
    fs: &str,
    start_path: &str,
    file_type: FileType,
    limit: Option<usize>,
    mut consumer: impl FnMut(&ListedEntry),
) -> Result<()> {
    if start_path != "/" {
        match get_path_map(session, fs, start_path)? {
            Some(entry) if entry.is_directory() => {}
            _ => return Ok(()),
        }
    }

    let mut emitted = 0usize;
    let mut frontier: Vec<String> = vec![start_path.to_string()];

    while let Some(dir) = frontier.pop() {
        let normalized = normalize_parent_path(&dir);
        let children = store::pathmap_list_children(session, fs, &normalized)?;
        for (name, entry) in children {
            let child_path = format!("{normalized}{name}");
            if file_type.matches(&name) {
                consumer(&ListedEntry {
                    path: child_path.clone(),
                    entry: entry.clone(),
                });
                emitted += 1;
            }
            if entry.is_directory() {
                frontier.push(child_path);
            }
            if let Some(limit) = limit {
                if emitted >= limit {
                    return Ok(());
                }
            }
        }
    }
    Ok(())
}
