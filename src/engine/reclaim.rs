//! Deferred reclamation queue (§4.5). Consumers poll [`list_orphaned_files`] per hour-of-day
//! partition and physically delete the returned blobs before calling [`remove_from_reclaim`].

use anyhow::Result;

use crate::store::{self, Consistency, Session};
use crate::types::ReclaimEntry;

/// Candidates queued before `now_millis - gc_grace_period_ms`, re-checked against the reverse map
/// so a blob that picked up a fresh reference after being tombstoned (Race B) is never handed
/// back to a caller about to delete it.
pub fn list_orphaned_files(
    session: &Session,
    gc_grace_period_ms: i64,
    now_millis: i64,
    partition: i64,
    limit: Option<usize>,
) -> Result<Vec<ReclaimEntry>> {
    let threshold = if gc_grace_period_ms <= 0 {
        now_millis
    } else {
        now_millis - gc_grace_period_ms
    };

    let candidates = store::reclaim_list_partition(session, partition, threshold, None)?;

    let mut out = Vec::new();
    for candidate in candidates {
        if store::reversemap_count(session, &candidate.fileid, Consistency::Quorum)? > 0 {
            continue;
        }
        out.push(candidate);
        if let Some(limit) = limit {
            if out.len() >= limit {
                break;
            }
        }
    }
    Ok(out)
}

/// Acknowledge a reclaimed blob: remove its reclaim-queue row once the physical store has
/// actually freed it.
pub fn remove_from_reclaim(session: &Session, entry: &ReclaimEntry) -> Result<()> {
    store::reclaim_remove(session, entry.partition, entry.deletion, &entry.fileid)
}
