// ── Query cache ──
//
// Results of product queries keyed by (operation, argument), tagged with
// what they provide, and invalidated by tag after mutations.

mod handle;
mod key;
mod query_cache;
mod state;

pub use handle::{QueryHandle, QueryStream};
pub use key::{QueryData, QueryKey, QueryValue, Tag};
pub use query_cache::{FetchTicket, QueryCache};
pub use state::{QueryState, QueryStatus};
