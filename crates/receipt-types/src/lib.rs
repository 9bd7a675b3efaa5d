pub mod types;

pub use types::{PayoutStatus, ReceiptRecord, RecordError};
