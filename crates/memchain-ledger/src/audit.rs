//! Audit trail filters

use memchain_types::Transaction;
use serde::{Deserialize, Serialize};

/// Filters for `Ledger::get_audit_trail`. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Substring searched for in the transaction's canonical data text
    #[serde(default)]
    pub entity_name: Option<String>,
    /// Exact operation name
    #[serde(default)]
    pub operation: Option<String>,
    /// Inclusive lower bound, epoch micros
    #[serde(default, rename = "start_time")]
    pub start_micros: Option<i64>,
    /// Inclusive upper bound, epoch micros
    #[serde(default, rename = "end_time")]
    pub end_micros: Option<i64>,
}

impl AuditQuery {
    /// Match everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to transactions mentioning `name`
    pub fn entity(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Restrict to one operation
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Restrict to an inclusive time window
    pub fn between(mut self, start_micros: Option<i64>, end_micros: Option<i64>) -> Self {
        self.start_micros = start_micros;
        self.end_micros = end_micros;
        self
    }

    /// Check a transaction against every set filter
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(start) = self.start_micros {
            if tx.timestamp_micros < start {
                return false;
            }
        }
        if let Some(end) = self.end_micros {
            if tx.timestamp_micros > end {
                return false;
            }
        }
        if let Some(op) = &self.operation {
            if &tx.operation != op {
                return false;
            }
        }
        if let Some(name) = &self.entity_name {
            if !tx.data_text().contains(name.as_str()) {
                return false;
            }
        }
        true
    }
}
