//! Provenance contract binding
//!
//! The contract exposes two methods: `uploadDocument(string)` records a CID for
//! the calling address, `verifyDocument(string)` returns the `(owner, timestamp)`
//! pair previously recorded for a CID. Calldata is encoded by hand: a 4-byte
//! Keccak-256 selector followed by one dynamic string argument.
//!
//! Writes go through the wallet provider (the wallet signs); reads and receipt
//! polling use the read-only RPC endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use tracing::{debug, info, instrument};

use crate::chain::wallet::{TransactionRequest, WalletProvider};
use crate::error::{Error, Result};

/// On-chain record for a CID, as returned by `verifyDocument`.
/// A zero owner address or zero timestamp means the document was never recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRecord {
    /// 0x-prefixed owner address.
    pub owner: String,
    /// Unix seconds at which the CID was recorded.
    pub timestamp: u64,
}

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

impl DocumentRecord {
    /// True when the contract returned its zero-value "not found" tuple.
    pub fn is_empty(&self) -> bool {
        self.owner.eq_ignore_ascii_case(ZERO_ADDRESS) || self.timestamp == 0
    }
}

#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Submit a provenance transaction carrying the CID and wait for it to be
    /// mined. Returns the confirmed transaction hash.
    async fn upload_document(&self, cid: &str) -> Result<String>;

    /// Query the `(owner, timestamp)` record for a CID.
    async fn verify_document(&self, cid: &str) -> Result<DocumentRecord>;
}

/// JSON-RPC implementation of [`ContractClient`].
pub struct ProvenanceContract<W> {
    wallet: Arc<W>,
    client: reqwest::Client,
    read_rpc_url: String,
    contract_address: String,
    receipt_poll_interval: Duration,
}

impl<W: WalletProvider> ProvenanceContract<W> {
    pub fn new(
        wallet: Arc<W>,
        read_rpc_url: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            client: reqwest::Client::new(),
            read_rpc_url: read_rpc_url.into(),
            contract_address: contract_address.into(),
            receipt_poll_interval: Duration::from_secs(2),
        }
    }

    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn read_rpc(&self, method: &str, params: Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });
        let body: Value = self
            .client
            .post(&self.read_rpc_url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = body.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(Error::QueryError(message.to_string()));
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Poll `eth_getTransactionReceipt` until the transaction settles.
    /// Waits indefinitely, matching the source's `tx.wait()` behavior.
    async fn await_receipt(&self, tx_hash: &str) -> Result<()> {
        loop {
            let receipt = self
                .read_rpc("eth_getTransactionReceipt", json!([tx_hash]))
                .await
                .map_err(|e| Error::TransactionFailed(e.to_string()))?;

            if let Some(status) = receipt.get("status").and_then(Value::as_str) {
                if status == "0x1" {
                    return Ok(());
                }
                return Err(Error::TransactionFailed(format!(
                    "transaction {tx_hash} reverted"
                )));
            }

            debug!(tx_hash, "transaction not yet mined");
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    /// The account that signs the provenance transaction: the wallet's first
    /// exposed account, prompting for connection if none is exposed yet.
    async fn signer_account(&self) -> Result<String> {
        let accounts = self.wallet.accounts().await?;
        if let Some(first) = accounts.into_iter().next() {
            return Ok(first);
        }
        let requested = self.wallet.request_accounts().await?;
        requested
            .into_iter()
            .next()
            .ok_or_else(|| Error::TransactionFailed("wallet exposed no accounts".to_string()))
    }
}

#[async_trait]
impl<W: WalletProvider> ContractClient for ProvenanceContract<W> {
    #[instrument(skip(self), fields(contract = %self.contract_address))]
    async fn upload_document(&self, cid: &str) -> Result<String> {
        let from = self.signer_account().await?;
        let tx = TransactionRequest {
            from,
            to: self.contract_address.clone(),
            data: encode_string_call("uploadDocument(string)", cid),
        };

        let tx_hash = self
            .wallet
            .send_transaction(&tx)
            .await
            .map_err(|e| Error::TransactionFailed(e.to_string()))?;
        info!(tx_hash, cid, "provenance transaction submitted");

        self.await_receipt(&tx_hash).await?;
        info!(tx_hash, "provenance transaction confirmed");
        Ok(tx_hash)
    }

    #[instrument(skip(self), fields(contract = %self.contract_address))]
    async fn verify_document(&self, cid: &str) -> Result<DocumentRecord> {
        let call = json!({
            "to": self.contract_address,
            "data": encode_string_call("verifyDocument(string)", cid),
        });
        let result = self.read_rpc("eth_call", json!([call, "latest"])).await?;

        let hex_result = result
            .as_str()
            .ok_or_else(|| Error::QueryError(format!("malformed eth_call result: {result}")))?;
        decode_owner_timestamp(hex_result)
    }
}

/// First four bytes of the Keccak-256 of the canonical signature.
fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// ABI-encode a call taking a single dynamic `string` argument:
/// selector, offset word (0x20), length word, then the bytes padded to 32.
pub fn encode_string_call(signature: &str, arg: &str) -> String {
    let bytes = arg.as_bytes();
    let mut data = Vec::with_capacity(4 + 64 + bytes.len().div_ceil(32) * 32);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&abi_word(32));
    data.extend_from_slice(&abi_word(bytes.len() as u64));
    data.extend_from_slice(bytes);
    let pad = bytes.len().div_ceil(32) * 32 - bytes.len();
    data.extend(std::iter::repeat(0u8).take(pad));
    format!("0x{}", hex::encode(data))
}

fn abi_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode an `(address, uint256)` return: two 32-byte words.
fn decode_owner_timestamp(hex_result: &str) -> Result<DocumentRecord> {
    let raw = hex::decode(hex_result.trim_start_matches("0x"))
        .map_err(|e| Error::QueryError(format!("non-hex eth_call result: {e}")))?;
    if raw.len() < 64 {
        return Err(Error::QueryError(format!(
            "eth_call result too short: {} bytes",
            raw.len()
        )));
    }

    let owner = format!("0x{}", hex::encode(&raw[12..32]));
    // The timestamp is unix seconds; anything past the low 8 bytes of the
    // uint256 word is a malformed result, not a value to truncate.
    if raw[32..56].iter().any(|b| *b != 0) {
        return Err(Error::QueryError(
            "timestamp out of range in eth_call result".to_string(),
        ));
    }
    let mut ts_bytes = [0u8; 8];
    ts_bytes.copy_from_slice(&raw[56..64]);
    let timestamp = u64::from_be_bytes(ts_bytes);

    Ok(DocumentRecord { owner, timestamp })
}
