use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid receipt record: {0}")]
    InvalidJson(String),
}

/// A payout as the dashboard stores it.
///
/// Field names follow the dashboard's camelCase JSON. Timestamps are kept as
/// the raw strings the dashboard produced; display code decides how to read
/// them so an odd value never rejects the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    pub id: String,
    #[serde(default)]
    pub status: PayoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_amount: Option<f64>,
    /// Single amount used when gross/net are not tracked separately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ReceiptRecord {
    /// Decode a record from the dashboard's JSON representation
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::InvalidJson(e.to_string()))
    }

    /// Gross amount, falling back to `amount`, then to zero
    pub fn gross(&self) -> f64 {
        self.gross_amount.or(self.amount).unwrap_or(0.0)
    }

    /// Net amount, falling back to `amount`, then to zero
    pub fn net(&self) -> f64 {
        self.net_amount.or(self.amount).unwrap_or(0.0)
    }

    /// Failure reason if one was recorded and it is not blank
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason
            .as_deref()
            .filter(|reason| !reason.trim().is_empty())
    }
}

/// Lifecycle state of a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    #[default]
    Pending,
    Processing,
    InTransit,
    Completed,
    Failed,
    Canceled,
    /// Any status string this version does not know about
    #[serde(other)]
    Unknown,
}

impl PayoutStatus {
    /// Human-readable label shown on receipts
    pub fn label(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "Pending",
            PayoutStatus::Processing => "Processing",
            PayoutStatus::InTransit => "In Transit",
            PayoutStatus::Completed => "Completed",
            PayoutStatus::Failed => "Failed",
            PayoutStatus::Canceled => "Canceled",
            PayoutStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decodes_dashboard_json() {
        let json = r#"{
            "id": "po_123",
            "status": "completed",
            "createdAt": "2024-03-01T10:00:00Z",
            "executedAt": "2024-03-02T10:00:00Z",
            "grossAmount": 455.0,
            "netAmount": 450.0,
            "destination": "Bank ****4567"
        }"#;
        let record = ReceiptRecord::from_json(json).unwrap();
        assert_eq!(record.id, "po_123");
        assert_eq!(record.status, PayoutStatus::Completed);
        assert_eq!(record.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(record.failed_at, None);
        assert_eq!(record.gross(), 455.0);
        assert_eq!(record.net(), 450.0);
    }

    #[test]
    fn test_amount_fallback() {
        let record = ReceiptRecord::from_json(r#"{"id":"po_1","amount":12.5}"#).unwrap();
        assert_eq!(record.gross(), 12.5);
        assert_eq!(record.net(), 12.5);

        let record = ReceiptRecord::from_json(r#"{"id":"po_1"}"#).unwrap();
        assert_eq!(record.gross(), 0.0);
        assert_eq!(record.net(), 0.0);
    }

    #[test]
    fn test_unknown_status_decodes() {
        let record = ReceiptRecord::from_json(r#"{"id":"po_1","status":"reversed"}"#).unwrap();
        assert_eq!(record.status, PayoutStatus::Unknown);
        assert_eq!(record.status.label(), "Unknown");
    }

    #[test]
    fn test_status_labels() {
        let record = ReceiptRecord::from_json(r#"{"id":"po_1","status":"in_transit"}"#).unwrap();
        assert_eq!(record.status.to_string(), "In Transit");
    }

    #[test]
    fn test_blank_failure_reason_is_none() {
        let record = ReceiptRecord {
            id: "po_1".into(),
            failure_reason: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(record.failure_reason(), None);
    }

    #[test]
    fn test_rejects_missing_id() {
        assert!(ReceiptRecord::from_json(r#"{"status":"failed"}"#).is_err());
    }
}
