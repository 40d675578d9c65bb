//! TripStore - persistent record storage for trip planning
//!
//! Records are stored as JSON documents in SQLite, one table per store,
//! partitioned by collection name. Each record type declares a set of indexed
//! fields which are written alongside the document and used for filtered
//! listing.
//!
//! ```ignore
//! use tripstore::{Filter, FilterOp, IndexValue, Store};
//!
//! let mut store = Store::open(".tripstore")?;
//! store.create(trip)?;
//! let drafts: Vec<Trip> = store.list(&[Filter::eq("status", "draft")])?;
//! ```

mod record;
mod store;

pub use record::{Filter, FilterOp, IndexValue, Record};
pub use store::Store;

/// Database file name inside the store directory
pub const DB_FILE: &str = "tripstore.db";

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
