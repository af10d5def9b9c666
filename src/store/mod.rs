//! Index-store adapter: schema, connection shim, and per-table statements (§4.2, §4.6).

mod queries;
mod schema;
mod session;

pub use queries::*;
pub use session::Session;
