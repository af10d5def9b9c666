//! Index-store adapter (§4.2): one function per logical statement, grouped by table.
//!
//! Consistency levels are modeled via [`Consistency`] but, since the backing engine (§6a) is
//! single-node, carry no behavioral difference today: every statement already observes the
//! latest committed state through the shared [`Session`]. The parameter is kept at the call
//! sites spec.md marks as strong (`existsFile`, the IN-list `exists`, reverse-map removal) so a
//! future distributed engine swap has nothing to rediscover.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::session::Session;
use crate::types::{FilesystemCounters, PathEntry, ReclaimEntry};

/// Read/write strength requested for a statement (§4.2). See module docs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consistency {
    Default,
    Quorum,
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<PathEntry> {
    Ok(PathEntry {
        fileid: row.get("fileid")?,
        filestorage: row.get("filestorage")?,
        size: row.get::<_, i64>("size")?.max(0) as u64,
        creation: row.get("creation")?,
        expiration: row.get("expiration")?,
        checksum: row.get("checksum")?,
    })
}

// ---- pathmap ----

pub fn pathmap_get(
    session: &Session,
    fs: &str,
    parentpath: &str,
    filename: &str,
) -> Result<Option<PathEntry>> {
    session.with(|conn| {
        conn.query_row(
            "SELECT fileid, filestorage, size, creation, expiration, checksum
             FROM pathmap WHERE filesystem = ?1 AND parentpath = ?2 AND filename = ?3",
            params![fs, parentpath, filename],
            row_to_entry,
        )
        .optional()
    })
}

/// IN-list existence probe over `(parentpath, candidates)`. Returns the first matching filename
/// the store yields (not order-preserving by candidate order; §4.3's `exists` only needs to know
/// which of the at-most-two candidates (`filename`, `filename/`) matched).
pub fn pathmap_exists_any(
    session: &Session,
    fs: &str,
    parentpath: &str,
    candidates: &[String],
    _consistency: Consistency,
) -> Result<Option<String>> {
    session.with(|conn| {
        let mut stmt = conn.prepare(
            "SELECT filename FROM pathmap WHERE filesystem = ?1 AND parentpath = ?2
             AND filename = ?3",
        )?;
        for candidate in candidates {
            if let Some(name) = stmt
                .query_row(params![fs, parentpath, candidate], |r| {
                    r.get::<_, String>(0)
                })
                .optional()?
            {
                return Ok(Some(name));
            }
        }
        Ok(None)
    })
}

pub fn pathmap_exists_file_count(
    session: &Session,
    fs: &str,
    parentpath: &str,
    filename: &str,
    _consistency: Consistency,
) -> Result<i64> {
    session.with(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM pathmap WHERE filesystem = ?1 AND parentpath = ?2 AND filename = ?3",
            params![fs, parentpath, filename],
            |r| r.get(0),
        )
    })
}

pub fn pathmap_list_children(
    session: &Session,
    fs: &str,
    normalized_parent: &str,
) -> Result<Vec<(String, PathEntry)>> {
    session.with(|conn| {
        let mut stmt = conn.prepare(
            "SELECT filename, fileid, filestorage, size, creation, expiration, checksum
             FROM pathmap WHERE filesystem = ?1 AND parentpath = ?2",
        )?;
        let rows = stmt.query_map(params![fs, normalized_parent], |row| {
            Ok((row.get::<_, String>("filename")?, row_to_entry(row)?))
        })?;
        rows.collect()
    })
}

pub fn pathmap_count_children(session: &Session, fs: &str, normalized_parent: &str) -> Result<i64> {
    session.with(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM pathmap WHERE filesystem = ?1 AND parentpath = ?2",
            params![fs, normalized_parent],
            |r| r.get(0),
        )
    })
}

pub fn pathmap_upsert(
    session: &Session,
    fs: &str,
    parentpath: &str,
    filename: &str,
    entry: &PathEntry,
) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "INSERT OR REPLACE INTO pathmap
             (filesystem, parentpath, filename, fileid, filestorage, size, creation, expiration, checksum)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                fs,
                parentpath,
                filename,
                entry.fileid,
                entry.filestorage,
                entry.size as i64,
                entry.creation,
                entry.expiration,
                entry.checksum,
            ],
        )?;
        Ok(())
    })
}

pub fn pathmap_delete(session: &Session, fs: &str, parentpath: &str, filename: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "DELETE FROM pathmap WHERE filesystem = ?1 AND parentpath = ?2 AND filename = ?3",
            params![fs, parentpath, filename],
        )?;
        Ok(())
    })
}

pub fn pathmap_set_expiration(
    session: &Session,
    fs: &str,
    parentpath: &str,
    filename: &str,
    expiration: Option<i64>,
) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "UPDATE pathmap SET expiration = ?1
             WHERE filesystem = ?2 AND parentpath = ?3 AND filename = ?4",
            params![expiration, fs, parentpath, filename],
        )?;
        Ok(())
    })
}

// ---- filechecksum ----

pub fn checksum_get(session: &Session, checksum: &str) -> Result<Option<(String, String)>> {
    session.with(|conn| {
        conn.query_row(
            "SELECT fileid, storage FROM filechecksum WHERE checksum = ?1",
            params![checksum],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()
    })
}

pub fn checksum_save(session: &Session, checksum: &str, fileid: &str, storage: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "INSERT OR REPLACE INTO filechecksum (checksum, fileid, storage) VALUES (?1, ?2, ?3)",
            params![checksum, fileid, storage],
        )?;
        Ok(())
    })
}

pub fn checksum_delete(session: &Session, checksum: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "DELETE FROM filechecksum WHERE checksum = ?1",
            params![checksum],
        )?;
        Ok(())
    })
}

// ---- reversemap_entries ----

pub fn reversemap_add(session: &Session, fileid: &str, path_entry: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO reversemap_entries (fileid, path_entry) VALUES (?1, ?2)",
            params![fileid, path_entry],
        )?;
        Ok(())
    })
}

pub fn reversemap_remove(
    session: &Session,
    fileid: &str,
    path_entry: &str,
    _consistency: Consistency,
) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "DELETE FROM reversemap_entries WHERE fileid = ?1 AND path_entry = ?2",
            params![fileid, path_entry],
        )?;
        Ok(())
    })
}

pub fn reversemap_count(session: &Session, fileid: &str, _consistency: Consistency) -> Result<i64> {
    session.with(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM reversemap_entries WHERE fileid = ?1",
            params![fileid],
            |r| r.get(0),
        )
    })
}

pub fn reversemap_get_paths(session: &Session, fileid: &str) -> Result<Vec<String>> {
    session.with(|conn| {
        let mut stmt =
            conn.prepare("SELECT path_entry FROM reversemap_entries WHERE fileid = ?1")?;
        let rows = stmt.query_map(params![fileid], |r| r.get::<_, String>(0))?;
        rows.collect()
    })
}

// ---- filesystem counters ----

pub fn filesystem_increment(
    session: &Session,
    fs: &str,
    delta_count: i64,
    delta_size: i64,
) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "INSERT INTO filesystem (filesystem, file_count, size) VALUES (?1, ?2, ?3)
             ON CONFLICT(filesystem) DO UPDATE SET
                file_count = file_count + excluded.file_count,
                size = size + excluded.size",
            params![fs, delta_count, delta_size],
        )?;
        Ok(())
    })
}

pub fn filesystem_get(session: &Session, fs: &str) -> Result<Option<FilesystemCounters>> {
    session.with(|conn| {
        conn.query_row(
            "SELECT file_count, size FROM filesystem WHERE filesystem = ?1",
            params![fs],
            |r| {
                Ok(FilesystemCounters {
                    file_count: r.get(0)?,
                    size: r.get(1)?,
                })
            },
        )
        .optional()
    })
}

pub fn filesystem_get_all(session: &Session) -> Result<Vec<String>> {
    session.with(|conn| {
        let mut stmt = conn.prepare("SELECT filesystem FROM filesystem")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        rows.collect()
    })
}

/// Delete the filesystem row iff `file_count == 0`. Returns whether it was purged.
pub fn filesystem_purge(session: &Session, fs: &str) -> Result<bool> {
    session.with(|conn| {
        let affected = conn.execute(
            "DELETE FROM filesystem WHERE filesystem = ?1 AND file_count = 0",
            params![fs],
        )?;
        Ok(affected > 0)
    })
}

// ---- reclaim ----

pub fn reclaim_enqueue(session: &Session, entry: &ReclaimEntry) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO reclaim (partition, deletion, fileid, storage, checksum)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.partition,
                entry.deletion,
                entry.fileid,
                entry.storage,
                entry.checksum
            ],
        )?;
        Ok(())
    })
}

pub fn reclaim_list_partition(
    session: &Session,
    partition: i64,
    threshold: i64,
    limit: Option<usize>,
) -> Result<Vec<ReclaimEntry>> {
    session.with(|conn| {
        let mut stmt = conn.prepare(
            "SELECT partition, deletion, fileid, storage, checksum FROM reclaim
             WHERE partition = ?1 AND deletion < ?2 ORDER BY deletion ASC",
        )?;
        let rows = stmt.query_map(params![partition, threshold], |r| {
            Ok(ReclaimEntry {
                partition: r.get(0)?,
                deletion: r.get(1)?,
                fileid: r.get(2)?,
                storage: r.get(3)?,
                checksum: r.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
            if let Some(limit) = limit {
                if out.len() >= limit {
                    break;
                }
            }
        }
        Ok(out)
    })
}

pub fn reclaim_remove(session: &Session, partition: i64, deletion: i64, fileid: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "DELETE FROM reclaim WHERE partition = ?1 AND deletion = ?2 AND fileid = ?3",
            params![partition, deletion, fileid],
        )?;
        Ok(())
    })
}

// ---- proxysites ----

pub fn proxysites_add(session: &Session, site: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO proxysites (site) VALUES (?1)",
            params![site],
        )?;
        Ok(())
    })
}

pub fn proxysites_remove(session: &Session, site: &str) -> Result<()> {
    session.with(|conn| {
        conn.execute("DELETE FROM proxysites WHERE site = ?1", params![site])?;
        Ok(())
    })
}

pub fn proxysites_list(session: &Session) -> Result<Vec<String>> {
    session.with(|conn| {
        let mut stmt = conn.prepare("SELECT site FROM proxysites")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        rows.collect()
    })
}

pub fn proxysites_truncate(session: &Session) -> Result<()> {
    session.with(|conn| {
        conn.execute("DELETE FROM proxysites", [])?;
        Ok(())
    })
}
