//! Verification query
//!
//! Read-only: given a CID, ask the contract who recorded it and when. Blank
//! input is rejected before any contract call; the zero-value tuple from the
//! contract means "not found", and an RPC failure is reported as a query error
//! distinct from not-found.

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::chain::ContractClient;
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    NotFound,
    Found { owner: String, timestamp: u64 },
}

impl VerificationOutcome {
    pub fn status_line(&self) -> String {
        match self {
            VerificationOutcome::NotFound => "Document not found on blockchain".to_string(),
            VerificationOutcome::Found { owner, timestamp } => format!(
                "Document verified! Uploaded by {owner} on {}",
                format_timestamp(*timestamp)
            ),
        }
    }
}

/// Render a unix-seconds timestamp for display.
pub fn format_timestamp(seconds: u64) -> String {
    match DateTime::<Utc>::from_timestamp(seconds as i64, 0) {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{seconds}s"),
    }
}

/// Verify a CID against the contract.
///
/// Returns `Err(EmptyInput)` for blank input without touching the contract and
/// `Err(QueryError)` when the RPC itself fails.
#[instrument(skip(contract))]
pub async fn verify_cid<C: ContractClient>(
    contract: &C,
    input: &str,
) -> Result<VerificationOutcome> {
    let cid = input.trim();
    if cid.is_empty() {
        return Err(Error::EmptyInput);
    }

    let record = match contract.verify_document(cid).await {
        Ok(record) => record,
        // Some contract builds revert with a reason instead of returning the
        // zero tuple; treat that revert as not-found rather than a failure.
        Err(e) if e.to_string().contains("Document not found") => {
            return Ok(VerificationOutcome::NotFound);
        }
        Err(Error::QueryError(message)) => return Err(Error::QueryError(message)),
        Err(other) => return Err(Error::QueryError(other.to_string())),
    };

    if record.is_empty() {
        return Ok(VerificationOutcome::NotFound);
    }
    Ok(VerificationOutcome::Found {
        owner: record.owner,
        timestamp: record.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_status_contains_owner_and_date() {
        let outcome = VerificationOutcome::Found {
            owner: "0xabc".to_string(),
            timestamp: 1_700_000_000,
        };
        let line = outcome.status_line();
        assert!(line.contains("0xabc"));
        assert!(line.contains("2023-11-14"));
    }

    #[test]
    fn timestamp_formatting_is_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
    }
}
