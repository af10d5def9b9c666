//! [`PathIndex`]: the single public entry point wiring [`crate::store::Session`], the background
//! [`Executor`], and [`Config`] into the full path-mapped storage index API (§6.4).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::engine::{dedup, pathmap, proxysites, reclaim};
use crate::executor::Executor;
use crate::paths;
use crate::store::Session;
use crate::time::{hour_of_day, now_millis};
use crate::types::{Existence, FileType, FilesystemCounters, ListedEntry, NewFile, PathEntry, ReclaimEntry};

/// Depth of the background job queue. Generous relative to expected insert/delete rates; a full
/// queue back-pressures callers rather than dropping work (see [`Executor::submit`]).
const JOB_QUEUE_CAPACITY: usize = 4096;

/// Reject a `filesystem` tag that would break the `marshall`/`unmarshall` round-trip the reverse
/// map depends on (spec.md's `marshall` contract requires no `:` in the tag).
fn check_fs(fs: &str) -> Result<()> {
    if paths::is_valid_filesystem(fs) {
        Ok(())
    } else {
        anyhow::bail!("invalid filesystem tag {fs:?}: must be non-empty and must not contain ':'")
    }
}

pub struct PathIndex {
    session: Arc<Session>,
    executor: Executor,
    config: Config,
}

impl PathIndex {
    /// Open (creating if absent) the on-disk database named after `config.keyspace` under
    /// `data_dir`.
    pub fn open(config: Config, data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = data_dir.as_ref().join(format!("{}.db", config.keyspace));
        let session = Arc::new(Session::open_file(path)?);
        Ok(Self {
            session,
            executor: Executor::new(JOB_QUEUE_CAPACITY),
            config,
        })
    }

    /// An ephemeral, in-memory index. Used by the CLI's `--memory` flag and by tests.
    pub fn open_memory(config: Config) -> Result<Self> {
        let session = Arc::new(Session::open_memory()?);
        Ok(Self {
            session,
            executor: Executor::new(JOB_QUEUE_CAPACITY),
            config,
        })
    }

    // ---- pathmap reads ----

    pub fn exists(&self, fs: &str, path: &str) -> Result<Existence> {
        check_fs(fs)?;
        pathmap::exists(&self.session, fs, path)
    }

    pub fn exists_file(&self, fs: &str, path: &str) -> Result<bool> {
        check_fs(fs)?;
        pathmap::exists_file(&self.session, fs, path)
    }

    pub fn is_directory(&self, fs: &str, path: &str) -> Result<bool> {
        check_fs(fs)?;
        pathmap::is_directory(&self.session, fs, path)
    }

    pub fn is_file(&self, fs: &str, path: &str) -> Result<bool> {
        check_fs(fs)?;
        pathmap::is_file(&self.session, fs, path)
    }

    pub fn get_path_map(&self, fs: &str, path: &str) -> Result<Option<PathEntry>> {
        check_fs(fs)?;
        pathmap::get_path_map(&self.session, fs, path)
    }

    pub fn get_file_length(&self, fs: &str, path: &str) -> Result<i64> {
        check_fs(fs)?;
        pathmap::get_file_length(&self.session, fs, path)
    }

    pub fn get_file_last_modified(&self, fs: &str, path: &str) -> Result<i64> {
        check_fs(fs)?;
        pathmap::get_file_last_modified(&self.session, fs, path)
    }

    pub fn list(&self, fs: &str, path: &str, file_type: FileType) -> Result<Vec<ListedEntry>> {
        check_fs(fs)?;
        pathmap::list(&self.session, fs, path, file_type)
    }

    pub fn traverse(
        &self,
        fs: &str,
        start_path: &str,
        file_type: FileType,
        limit: Option<usize>,
        consumer: impl FnMut(&ListedEntry),
    ) -> Result<()> {
        check_fs(fs)?;
        pathmap::traverse(&self.session, fs, start_path, file_type, limit, consumer)
    }

    /// Resolves to the blob's storage key, lazily reclaiming (and returning `None` for) an
    /// entry whose `expiration` has already passed.
    pub fn get_storage_file(&self, fs: &str, path: &str) -> Result<Option<String>> {
        check_fs(fs)?;
        let Some(entry) = pathmap::get_path_map(&self.session, fs, path)? else {
            return Ok(None);
        };
        if let Some(expiration) = entry.expiration {
            if expiration < now_millis() {
                dedup::delete(&self.session, &self.executor, fs, path, true)?;
                return Ok(None);
            }
        }
        Ok(entry.filestorage)
    }

    pub fn expire(&self, fs: &str, path: &str, expiration: Option<i64>) -> Result<bool> {
        check_fs(fs)?;
        pathmap::expire(&self.session, fs, path, expiration)
    }

    pub fn make_dirs(&self, fs: &str, dir_path: &str) -> Result<()> {
        check_fs(fs)?;
        pathmap::make_dirs(&self.session, fs, dir_path)
    }

    // ---- dedup writes ----

    pub fn insert(&self, fs: &str, path: &str, new_file: &NewFile) -> Result<()> {
        check_fs(fs)?;
        dedup::insert(&self.session, &self.executor, fs, path, new_file)
    }

    pub fn delete(&self, fs: &str, path: &str, force: bool) -> Result<bool> {
        check_fs(fs)?;
        dedup::delete(&self.session, &self.executor, fs, path, force)
    }

    /// Copy an existing entry to `dest_path`, sharing the source blob (no new physical copy, no
    /// fresh checksum work: the reverse map simply gains another reference). Returns `false` if
    /// `src_path` does not exist.
    pub fn copy(
        &self,
        fs: &str,
        src_path: &str,
        dest_path: &str,
        creation: Option<i64>,
        expiration: Option<i64>,
    ) -> Result<bool> {
        check_fs(fs)?;
        let Some(src) = pathmap::get_path_map(&self.session, fs, src_path)? else {
            return Ok(false);
        };
        if src.is_directory() {
            anyhow::bail!("cannot copy directory {src_path}; use make_dirs at the destination");
        }
        let new_file = NewFile {
            fileid: src.fileid.unwrap_or_default(),
            filestorage: src.filestorage.unwrap_or_default(),
            size: src.size,
            creation: creation.unwrap_or_else(now_millis),
            expiration: expiration.or(src.expiration),
            checksum: src.checksum,
        };
        dedup::insert(&self.session, &self.executor, fs, dest_path, &new_file)?;
        Ok(true)
    }

    // ---- reclaim ----

    pub fn list_orphaned_files(&self, limit: Option<usize>) -> Result<Vec<ReclaimEntry>> {
        let now = now_millis();
        reclaim::list_orphaned_files(
            &self.session,
            self.config.gc_grace_period_ms(),
            now,
            hour_of_day(now),
            limit,
        )
    }

    pub fn list_orphaned_files_for_partition(
        &self,
        partition: i64,
        limit: Option<usize>,
    ) -> Result<Vec<ReclaimEntry>> {
        reclaim::list_orphaned_files(
            &self.session,
            self.config.gc_grace_period_ms(),
            now_millis(),
            partition,
            limit,
        )
    }

    pub fn remove_from_reclaim(&self, entry: &ReclaimEntry) -> Result<()> {
        reclaim::remove_from_reclaim(&self.session, entry)
    }

    // ---- filesystem counters ----

    pub fn get_filesystem(&self, fs: &str) -> Result<Option<FilesystemCounters>> {
        check_fs(fs)?;
        crate::store::filesystem_get(&self.session, fs)
    }

    pub fn get_filesystems(&self) -> Result<Vec<String>> {
        crate::store::filesystem_get_all(&self.session)
    }

    pub fn purge_filesystem(&self, fs: &str) -> Result<bool> {
        check_fs(fs)?;
        crate::store::filesystem_purge(&self.session, fs)
    }

    // ---- checksum / reverse map ----

    pub fn get_file_checksum(&self, fs: &str, path: &str) -> Result<Option<String>> {
        check_fs(fs)?;
        Ok(pathmap::get_path_map(&self.session, fs, path)?.and_then(|e| e.checksum))
    }

    /// Every path the reverse map has recorded for `fileid`, decoded from their marshalled
    /// `filesystem:path` keys back into `(filesystem, path)` pairs.
    pub fn get_paths_by_file_id(&self, fileid: &str) -> Result<Vec<(String, String)>> {
        Ok(crate::store::reversemap_get_paths(&self.session, fileid)?
            .into_iter()
            .filter_map(|marshalled| paths::unmarshall(&marshalled))
            .collect())
    }

    /// Every candidate filesystem that has an entry at `path`, as an IN-style membership query.
    /// Not order-preserving; see [`Self::get_first_filesystem_containing`] when caller order
    /// matters.
    pub fn get_filesystem_containing(&self, candidates: &[String], path: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for fs in candidates {
            check_fs(fs)?;
            if pathmap::exists(&self.session, fs, path)? != Existence::None {
                out.push(fs.clone());
            }
        }
        Ok(out)
    }

    /// First filesystem from `candidates`, in caller-supplied order, that has an entry at `path`.
    /// The underlying store's IN query does not preserve order, so this always walks
    /// `candidates` itself rather than post-filtering a store-returned set.
    pub fn get_first_filesystem_containing(
        &self,
        candidates: &[String],
        path: &str,
    ) -> Result<Option<String>> {
        for fs in candidates {
            check_fs(fs)?;
            if pathmap::exists(&self.session, fs, path)? != Existence::None {
                return Ok(Some(fs.clone()));
            }
        }
        Ok(None)
    }

    // ---- proxy sites ----

    pub fn add_proxy_site(&self, site: &str) -> Result<()> {
        proxysites::add(&self.session, site)
    }

    pub fn remove_proxy_site(&self, site: &str) -> Result<()> {
        proxysites::remove(&self.session, site)
    }

    pub fn list_proxy_sites(&self) -> Result<Vec<String>> {
        proxysites::list(&self.session)
    }

    pub fn truncate_proxy_sites(&self) -> Result<()> {
        proxysites::truncate(&self.session)
    }

    // ---- lifecycle ----

    /// Block until every background job submitted so far has completed. Intended for tests and
    /// for callers that need to observe post-processing effects deterministically.
    pub fn flush(&self) {
        self.executor.flush();
    }

    /// Drain the background queue and release the connection. Safe to call more than once.
    pub fn close(&mut self) {
        self.executor.close();
        self.session.close();
    }
}

impl Drop for PathIndex {
    fn drop(&mut self) {
        self.close();
    }
}
