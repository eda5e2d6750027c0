//! Upload orchestrator
//!
//! Drives the sequence: selected file → pin to storage → CID → compare the active
//! wallet chain with the expected chain → either submit the provenance transaction
//! immediately or pause, prompt for a network switch, and resume the same pending
//! CID once the switch succeeds.
//!
//! The whole attempt lives in one tagged `UploadPhase` value so illegal
//! combinations ("stored" with a retained pending CID) are unrepresentable. There
//! is a single current-attempt slot: initiating a new upload bumps a generation
//! counter, and every suspended step re-checks the generation before committing
//! its result, so a superseded step's outcome is discarded.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::chain::{ChainDescriptor, ContractClient, WalletProvider};
use crate::error::Error;
use crate::storage::{StorageProvider, UploadMetadata};

/// A file the user picked for upload.
#[derive(Clone, Debug)]
pub struct FileSelection {
    pub name: String,
    pub data: Vec<u8>,
}

/// Why an attempt ended in `Failed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    NoFileSelected,
    StorageUploadFailed(String),
    TransactionFailed(String),
}

/// Phase of the current upload attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadPhase {
    Idle,
    Uploading,
    NetworkCheck {
        cid: String,
    },
    /// Chain mismatch detected; the CID is retained while the user decides
    /// whether to switch networks or cancel.
    AwaitingSwitch {
        cid: String,
        target: ChainDescriptor,
        last_error: Option<String>,
    },
    /// The expected chain was added to the wallet. The attempt stays paused with
    /// the CID retained until the user re-triggers the upload.
    Paused {
        cid: String,
    },
    Storing {
        cid: String,
    },
    Stored {
        cid: String,
        tx_hash: String,
    },
    Failed {
        cid: Option<String>,
        reason: FailureReason,
    },
}

impl UploadPhase {
    /// User-visible status text. Every phase and failure kind maps to a
    /// distinct message.
    pub fn status_line(&self) -> String {
        match self {
            UploadPhase::Idle => "Ready".to_string(),
            UploadPhase::Uploading => "Uploading to IPFS...".to_string(),
            UploadPhase::NetworkCheck { .. } => "Checking wallet network...".to_string(),
            UploadPhase::AwaitingSwitch {
                target, last_error, ..
            } => match last_error {
                Some(message) => message.clone(),
                None => format!(
                    "Wrong network: switch to {} to continue",
                    target.chain_name
                ),
            },
            UploadPhase::Paused { cid } => {
                format!("Network added. Re-run the upload to store CID {cid}")
            }
            UploadPhase::Storing { .. } => "Storing CID on blockchain...".to_string(),
            UploadPhase::Stored { cid, .. } => format!("Document stored with CID: {cid}"),
            UploadPhase::Failed { reason, .. } => match reason {
                FailureReason::NoFileSelected => "Error: Please upload a file".to_string(),
                FailureReason::StorageUploadFailed(msg) => format!("Upload failed: {msg}"),
                FailureReason::TransactionFailed(msg) => {
                    format!("Blockchain transaction failed: {msg}")
                }
            },
        }
    }
}

/// Result of initiating (or re-triggering) an upload.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadOutcome {
    Stored {
        cid: String,
        tx_hash: String,
    },
    /// Chain mismatch: the attempt is parked in `AwaitingSwitch` and the caller
    /// should prompt the user.
    SwitchRequired {
        cid: String,
        target: ChainDescriptor,
    },
    Failed {
        cid: Option<String>,
        reason: FailureReason,
    },
    /// A newer attempt superseded this one while a call was in flight; the
    /// result was discarded.
    Superseded,
}

/// Result of the user-triggered *Switch* action while awaiting a network switch.
#[derive(Clone, Debug, PartialEq)]
pub enum SwitchOutcome {
    /// Switch succeeded and the retained CID was submitted and confirmed.
    Resumed { cid: String, tx_hash: String },
    /// Switch succeeded but the resumed transaction failed.
    ResumeFailed { cid: String, reason: FailureReason },
    /// The wallet did not know the chain; adding it succeeded. The attempt is
    /// paused with the CID retained until the user re-triggers the upload.
    ChainAdded { cid: String },
    /// Switch or add-chain failed; the attempt remains in `AwaitingSwitch` with
    /// the error surfaced.
    SwitchError { message: String },
    /// No attempt was awaiting a switch.
    NotAwaitingSwitch,
    Superseded,
}

struct Slot {
    generation: u64,
    phase: UploadPhase,
    /// Name of the file behind the current attempt; lets a re-trigger after the
    /// paused state reuse the retained CID for the same file.
    file_name: Option<String>,
}

pub struct UploadOrchestrator<S, W, C> {
    storage: Arc<S>,
    wallet: Arc<W>,
    contract: Arc<C>,
    expected_chain: ChainDescriptor,
    slot: Mutex<Slot>,
}

impl<S, W, C> UploadOrchestrator<S, W, C>
where
    S: StorageProvider,
    W: WalletProvider,
    C: ContractClient,
{
    pub fn new(
        storage: Arc<S>,
        wallet: Arc<W>,
        contract: Arc<C>,
        expected_chain: ChainDescriptor,
    ) -> Self {
        Self {
            storage,
            wallet,
            contract,
            expected_chain,
            slot: Mutex::new(Slot {
                generation: 0,
                phase: UploadPhase::Idle,
                file_name: None,
            }),
        }
    }

    /// Current phase of the current attempt.
    pub async fn phase(&self) -> UploadPhase {
        self.slot.lock().await.phase.clone()
    }

    /// Initiate an upload. Always starts (or resumes) the current attempt,
    /// superseding any non-terminal prior attempt.
    #[instrument(skip(self, selection))]
    pub async fn begin_upload(&self, selection: Option<FileSelection>) -> UploadOutcome {
        let (my_gen, resume_cid, selection) = {
            let mut slot = self.slot.lock().await;
            slot.generation += 1;
            let my_gen = slot.generation;

            let Some(selection) = selection else {
                slot.phase = UploadPhase::Failed {
                    cid: None,
                    reason: FailureReason::NoFileSelected,
                };
                slot.file_name = None;
                return UploadOutcome::Failed {
                    cid: None,
                    reason: FailureReason::NoFileSelected,
                };
            };

            // A paused attempt keeps its CID so a re-trigger for the same file
            // can skip the second pin and go straight to the network check.
            let resume_cid = match (&slot.phase, slot.file_name.as_deref()) {
                (UploadPhase::Paused { cid }, Some(name)) if name == selection.name => {
                    Some(cid.clone())
                }
                _ => None,
            };

            slot.file_name = Some(selection.name.clone());
            slot.phase = match &resume_cid {
                Some(cid) => UploadPhase::NetworkCheck { cid: cid.clone() },
                None => UploadPhase::Uploading,
            };
            (my_gen, resume_cid, selection)
        };

        let cid = match resume_cid {
            Some(cid) => {
                info!(cid, "reusing retained CID from paused attempt");
                cid
            }
            None => {
                let metadata = UploadMetadata::for_file(selection.name.clone(), &selection.data);
                match self.storage.upload(selection.data, metadata).await {
                    Ok(cid) => cid,
                    Err(e) => {
                        let reason = FailureReason::StorageUploadFailed(e.to_string());
                        return self.fail(my_gen, None, reason).await;
                    }
                }
            }
        };

        self.network_check(my_gen, cid).await
    }

    /// Compare the wallet's active chain with the expected chain, then either
    /// submit or park the attempt for a user-driven switch.
    async fn network_check(&self, my_gen: u64, cid: String) -> UploadOutcome {
        {
            let mut slot = self.slot.lock().await;
            if slot.generation != my_gen {
                return UploadOutcome::Superseded;
            }
            slot.phase = UploadPhase::NetworkCheck { cid: cid.clone() };
        }

        let active = match self.wallet.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                let reason = FailureReason::TransactionFailed(e.to_string());
                return self.fail(my_gen, Some(cid), reason).await;
            }
        };

        if active == self.expected_chain.chain_id {
            return self.submit_transaction(my_gen, cid).await;
        }

        warn!(
            active,
            expected = self.expected_chain.chain_id,
            "wallet is on the wrong network"
        );
        let target = self.expected_chain.clone();
        let mut slot = self.slot.lock().await;
        if slot.generation != my_gen {
            return UploadOutcome::Superseded;
        }
        slot.phase = UploadPhase::AwaitingSwitch {
            cid: cid.clone(),
            target: target.clone(),
            last_error: None,
        };
        UploadOutcome::SwitchRequired { cid, target }
    }

    /// Submit the provenance transaction and await confirmation. The storing
    /// and resuming paths both land here.
    async fn submit_transaction(&self, my_gen: u64, cid: String) -> UploadOutcome {
        {
            let mut slot = self.slot.lock().await;
            if slot.generation != my_gen {
                return UploadOutcome::Superseded;
            }
            slot.phase = UploadPhase::Storing { cid: cid.clone() };
        }

        let result = self.contract.upload_document(&cid).await;

        let mut slot = self.slot.lock().await;
        if slot.generation != my_gen {
            return UploadOutcome::Superseded;
        }
        match result {
            Ok(tx_hash) => {
                info!(cid, tx_hash, "document stored");
                slot.phase = UploadPhase::Stored {
                    cid: cid.clone(),
                    tx_hash: tx_hash.clone(),
                };
                UploadOutcome::Stored { cid, tx_hash }
            }
            Err(e) => {
                // The CID is kept so the caller can see which CID failed.
                let reason = FailureReason::TransactionFailed(e.to_string());
                slot.phase = UploadPhase::Failed {
                    cid: Some(cid.clone()),
                    reason: reason.clone(),
                };
                UploadOutcome::Failed {
                    cid: Some(cid),
                    reason,
                }
            }
        }
    }

    /// User action: ask the wallet to switch to the expected chain and resume
    /// the pending CID. Falls back to adding the chain when the wallet does not
    /// recognize it.
    #[instrument(skip(self))]
    pub async fn switch_and_resume(&self) -> SwitchOutcome {
        let (my_gen, cid, target) = {
            let slot = self.slot.lock().await;
            match &slot.phase {
                UploadPhase::AwaitingSwitch { cid, target, .. } => {
                    (slot.generation, cid.clone(), target.clone())
                }
                _ => return SwitchOutcome::NotAwaitingSwitch,
            }
        };

        match self.wallet.switch_chain(target.chain_id).await {
            Ok(()) => match self.submit_transaction(my_gen, cid.clone()).await {
                UploadOutcome::Stored { cid, tx_hash } => SwitchOutcome::Resumed { cid, tx_hash },
                UploadOutcome::Failed { reason, .. } => {
                    SwitchOutcome::ResumeFailed { cid, reason }
                }
                UploadOutcome::Superseded => SwitchOutcome::Superseded,
                // Submission never re-enters the network check, so this arm
                // cannot be reached; map it to an error rather than panic.
                UploadOutcome::SwitchRequired { .. } => SwitchOutcome::SwitchError {
                    message: Error::SwitchFailed("unexpected re-prompt after switch".to_string())
                        .to_string(),
                },
            },
            Err(e) if e.is_unrecognized_chain() => {
                info!(chain = target.chain_id, "chain unknown to wallet, adding it");
                self.add_chain(my_gen, cid, target).await
            }
            Err(e) => {
                let message = Error::SwitchFailed(e.to_string()).to_string();
                self.record_switch_error(my_gen, message.clone()).await;
                SwitchOutcome::SwitchError { message }
            }
        }
    }

    async fn add_chain(&self, my_gen: u64, cid: String, target: ChainDescriptor) -> SwitchOutcome {
        match self.wallet.add_chain(&target).await {
            Ok(()) => {
                let mut slot = self.slot.lock().await;
                if slot.generation != my_gen {
                    return SwitchOutcome::Superseded;
                }
                // Observed behavior preserved: adding the chain never
                // auto-submits. The attempt pauses with the CID retained and
                // the user must re-trigger the upload.
                slot.phase = UploadPhase::Paused { cid: cid.clone() };
                SwitchOutcome::ChainAdded { cid }
            }
            Err(e) => {
                // Surfaced verbatim.
                let message = e.to_string();
                self.record_switch_error(my_gen, message.clone()).await;
                SwitchOutcome::SwitchError { message }
            }
        }
    }

    async fn record_switch_error(&self, my_gen: u64, message: String) {
        let mut slot = self.slot.lock().await;
        if slot.generation != my_gen {
            return;
        }
        if let UploadPhase::AwaitingSwitch { last_error, .. } = &mut slot.phase {
            *last_error = Some(message);
        }
    }

    /// User action: abandon the pending switch. Discards the retained CID and
    /// target chain and returns to `Idle`.
    #[instrument(skip(self))]
    pub async fn cancel_switch(&self) {
        let mut slot = self.slot.lock().await;
        match slot.phase {
            UploadPhase::AwaitingSwitch { .. } | UploadPhase::Paused { .. } => {
                // Bump the generation so an in-flight resumption, if any, is
                // discarded when it settles.
                slot.generation += 1;
                slot.phase = UploadPhase::Idle;
                slot.file_name = None;
            }
            _ => {}
        }
    }

    async fn fail(
        &self,
        my_gen: u64,
        cid: Option<String>,
        reason: FailureReason,
    ) -> UploadOutcome {
        let mut slot = self.slot.lock().await;
        if slot.generation != my_gen {
            return UploadOutcome::Superseded;
        }
        slot.phase = UploadPhase::Failed {
            cid: cid.clone(),
            reason: reason.clone(),
        };
        UploadOutcome::Failed { cid, reason }
    }
}
