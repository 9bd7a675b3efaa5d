use receipt_types::RecordError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("Invalid receipt record: {0}")]
    InvalidRecord(String),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),
}

impl From<RecordError> for ReceiptError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::InvalidJson(msg) => ReceiptError::InvalidRecord(msg),
        }
    }
}
