//! Fixed schema for the six logical tables (spec §6.1), mapped onto the embedded engine (§6a).

/// WAL tuning pragmas, reused from the teacher crate's own index database setup.
pub(crate) const WAL_PRAGMAS: &str = r#"
PRAGMA synchronous = NORMAL;
PRAGMA wal_autocheckpoint = 1000;
PRAGMA journal_size_limit = 67108864;
"#;

/// `reversemap.paths : set<text>` has no native SQLite equivalent; it is decomposed into a
/// child table keyed by `(fileid, path_entry)`, where row existence is set membership.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pathmap (
    filesystem  TEXT NOT NULL,
    parentpath  TEXT NOT NULL,
    filename    TEXT NOT NULL,
    fileid      TEXT,
    filestorage TEXT,
    size        INTEGER NOT NULL DEFAULT 0,
    creation    INTEGER NOT NULL,
    expiration  INTEGER,
    checksum    TEXT,
    PRIMARY KEY (filesystem, parentpath, filename)
);
CREATE INDEX IF NOT EXISTS idx_pathmap_listing ON pathmap(filesystem, parentpath);

CREATE TABLE IF NOT EXISTS filechecksum (
    checksum TEXT PRIMARY KEY,
    fileid   TEXT NOT NULL,
    storage  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reversemap_entries (
    fileid     TEXT NOT NULL,
    path_entry TEXT NOT NULL,
    PRIMARY KEY (fileid, path_entry)
);

CREATE TABLE IF NOT EXISTS filesystem (
    filesystem TEXT PRIMARY KEY,
    file_count INTEGER NOT NULL DEFAULT 0,
    size       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS reclaim (
    partition INTEGER NOT NULL,
    deletion  INTEGER NOT NULL,
    fileid    TEXT NOT NULL,
    storage   TEXT NOT NULL,
    checksum  TEXT,
    PRIMARY KEY (partition, deletion, fileid)
);
CREATE INDEX IF NOT EXISTS idx_reclaim_partition ON reclaim(partition, deletion);

CREATE TABLE IF NOT EXISTS proxysites (
    site TEXT PRIMARY KEY
);
"#;
