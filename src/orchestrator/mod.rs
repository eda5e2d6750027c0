//! Orchestration layer: the upload state machine and the verification query.

mod upload;
mod verify;

pub use upload::{
    FailureReason, FileSelection, SwitchOutcome, UploadOrchestrator, UploadOutcome, UploadPhase,
};
pub use verify::{format_timestamp, verify_cid, VerificationOutcome};
