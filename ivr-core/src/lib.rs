pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use config::IvrConfig;
pub use error::{IvrError, ValidationError};
pub use models::{CallRecord, CallTable, CallUpdate, COLUMNS};
pub use store::{CallStore, InMemoryStore, XlsxStore};
