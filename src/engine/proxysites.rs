//! ProxySite CRUD (§4.6): a flat, peripheral site registry. No dedup, no background work.

use anyhow::Result;

use crate::store::{self, Session};

pub fn add(session: &Session, site: &str) -> Result<()> {
    store::proxysites_add(session, site)
}

pub fn remove(session: &Session, site: &str) -> Result<()> {
    store::proxysites_remove(session, site)
}

pub fn list(session: &Session) -> Result<Vec<String>> {
    store::proxysites_list(session)
}

pub fn truncate(session: &Session) -> Result<()> {
    store::proxysites_truncate(session)
}
