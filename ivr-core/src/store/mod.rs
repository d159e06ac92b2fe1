//! Storage abstraction for call records.
//!
//! A [`CallStore`] hands out the entire record set and takes it back in
//! full. There is no incremental update, no locking and no transaction
//! spanning a `load` and a later `persist`: two requests that interleave
//! their read-modify-write cycles lose one of the updates, and the last
//! `persist` wins.
//!
//! Implementations must be `Send + Sync` so they can sit behind an `Arc`
//! in the HTTP state.

pub mod memory;
pub mod xlsx;

use async_trait::async_trait;

use crate::error::IvrError;
use crate::models::CallTable;

pub use memory::InMemoryStore;
pub use xlsx::XlsxStore;

#[async_trait]
pub trait CallStore: Send + Sync {
    /// Read the full record set. A store that does not exist yet is created
    /// empty and an empty table is returned.
    async fn load(&self) -> Result<CallTable, IvrError>;

    /// Overwrite the store with exactly `table`.
    async fn persist(&self, table: &CallTable) -> Result<(), IvrError>;

    /// Human-readable location, for logs and `/health`.
    fn describe(&self) -> String;
}
