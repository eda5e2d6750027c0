//! Crate-wide error type for Trustify
//!
//! Every storage/RPC failure is caught at its call site and converted into one of
//! these variants; nothing propagates as an uncaught fault. Each variant maps to a
//! distinct user-visible status message.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Upload was initiated without a file selection. No external call is made.
    #[error("no file selected")]
    NoFileSelected,

    /// The pinning service rejected the upload or the transport failed.
    #[error("storage upload failed: {0}")]
    StorageUploadFailed(String),

    /// Listing previously pinned files failed.
    #[error("failed to list pinned files: {0}")]
    StorageListFailed(String),

    /// The wallet refused or failed a chain-switch request for a reason other
    /// than the chain being unknown to it.
    #[error("chain switch failed: {0}")]
    SwitchFailed(String),

    /// `wallet_addEthereumChain` failed; the message is surfaced verbatim.
    #[error("{0}")]
    AddChainFailed(String),

    /// Signing was rejected, the transaction reverted, or the RPC errored.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Verification was requested with a blank CID.
    #[error("no CID provided")]
    EmptyInput,

    /// The contract query itself failed. A not-found document is not an error;
    /// it is reported as a verification outcome.
    #[error("contract query failed: {0}")]
    QueryError(String),

    /// A wallet JSON-RPC call returned an error object. The EIP-1193 code is
    /// preserved so callers can distinguish e.g. 4902 (unrecognized chain).
    #[error("wallet RPC error {code}: {message}")]
    WalletRpc { code: i64, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// EIP-1193 error code for a switch request naming a chain the wallet does
    /// not know about. Triggers the add-chain fallback.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    /// EIP-1193 error code for a user rejecting a request.
    pub const USER_REJECTED: i64 = 4001;

    pub fn is_unrecognized_chain(&self) -> bool {
        matches!(self, Error::WalletRpc { code, .. } if *code == Self::UNRECOGNIZED_CHAIN)
    }
}
