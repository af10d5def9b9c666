//! Recognized configuration options (see spec §6.2).
//!
//! Mirrors the teacher crate's "tuning and thresholds in one place" approach: plain structs and
//! constants rather than a config-file-parsing crate, since this index's configuration surface
//! is small and fixed.

/// Connection and tuning options. `host`/`port`/`username`/`password`/`replication_factor` are
/// recognized for interface parity with a networked, replicated engine; the embedded engine this
/// crate ships only consumes `keyspace` (as a file path stem) and `gc_grace_period_hours`.
#[derive(Clone, Debug)]
pub struct Config {
    /// Endpoint host. Unused by the embedded engine; kept for interface parity.
    pub host: String,
    /// Endpoint port. Unused by the embedded engine; kept for interface parity.
    pub port: u16,
    /// Optional credentials. Unused by the embedded engine; kept for interface parity.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Keyspace name. Used as the backing database's file path stem.
    pub keyspace: String,
    /// Replication factor. Unused by the embedded engine; kept for interface parity.
    pub replication_factor: u32,
    /// Delay before a reconnect attempt, in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Minimum age (hours) a reclaim entry must reach before it is eligible for physical
    /// deletion. `<= 0` disables the delay.
    pub gc_grace_period_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9042,
            username: None,
            password: None,
            keyspace: "pathvault".to_string(),
            replication_factor: 1,
            reconnect_delay_ms: 60_000,
            gc_grace_period_hours: 24,
        }
    }
}

impl Config {
    /// Grace period expressed in milliseconds, the unit the reclaim queue compares timestamps in.
    pub fn gc_grace_period_ms(&self) -> i64 {
        self.gc_grace_period_hours.max(0) * 3_600_000
    }
}
