//! TOML configuration for receipt wording.
//!
//! Only text is configurable. Page geometry and the wrapping heuristic are
//! fixed so that the same record always lays out the same way.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Wording used on generated receipts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Title printed in the header band
    pub title: String,
    /// Line printed under the title
    pub subtitle: String,
    /// Appended to every amount, e.g. "455.00 US$"
    pub currency_suffix: String,
    /// Static caption at the bottom of the page
    pub footer_note: String,
    /// Lowercased prefix of the output file name
    pub file_prefix: String,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            title: "Payout Receipt".to_string(),
            subtitle: "Proof of payout".to_string(),
            currency_suffix: "US$".to_string(),
            footer_note: "This document was generated automatically and is valid without a signature."
                .to_string(),
            file_prefix: "payout".to_string(),
        }
    }
}

impl ReceiptConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take their defaults.
    ///
    /// ```
    /// use receipt_pdf::config::ReceiptConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ReceiptConfig::from_str(r#"currency_suffix = "EUR""#)?;
    /// assert_eq!(config.currency_suffix, "EUR");
    /// assert_eq!(config.title, "Payout Receipt");
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}
