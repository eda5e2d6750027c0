//! Trustify — document-provenance client
//!
//! Pins a file to an IPFS pinning service, records the resulting CID on an
//! Ethereum-compatible provenance contract through a wallet provider, lists
//! previously pinned files and verifies CIDs against the contract. All durable
//! state lives in those two external systems.
//!
//! The interesting part is [`orchestrator::UploadOrchestrator`]: the upload flow
//! with network-mismatch recovery (switch or add the expected chain, then resume
//! the pending CID). The external collaborators sit behind capability traits
//! ([`chain::WalletProvider`], [`chain::ContractClient`],
//! [`storage::StorageProvider`]) so the flow is testable without a real wallet,
//! chain or pinning account.

pub mod chain;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod storage;

pub use error::{Error, Result};
