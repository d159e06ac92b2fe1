pub mod call;
pub mod table;

pub use call::{CallRecord, CallUpdate, COLUMNS, MAX_CELL_CHARS};
pub use table::CallTable;
