//! Wallet provider binding
//!
//! The orchestrator never talks to a wallet directly; it goes through the
//! `WalletProvider` capability trait so it can be tested without a real wallet.
//! `HttpWallet` is the concrete JSON-RPC implementation. EIP-1193 error codes are
//! preserved on the error path so callers can distinguish 4902 (unrecognized
//! chain) from an ordinary refusal.
//!
//! Account/chain changes are observed by polling: `WalletWatcher` diffs
//! `eth_accounts` / `eth_chainId` between cycles and emits a `WalletEvent` when
//! something changed. The subscription is a handle with explicit teardown so
//! listeners do not leak across orchestrator lifecycles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::chain::descriptor::{format_chain_id, parse_chain_id, ChainDescriptor};
use crate::error::{Error, Result};

/// Transaction request submitted through the wallet (`eth_sendTransaction`).
#[derive(Clone, Debug, Serialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    /// 0x-prefixed ABI calldata.
    pub data: String,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet has already exposed (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<String>>;

    /// Prompt the wallet to connect and expose accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// The chain the wallet is currently connected to (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64>;

    /// Ask the wallet to switch to a chain it already knows
    /// (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    /// Ask the wallet to add a chain it does not know yet
    /// (`wallet_addEthereumChain`).
    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<()>;

    /// Submit a transaction for signing; returns the transaction hash.
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String>;

    /// Disconnect the wallet from the app (`wallet_revokePermissions`).
    async fn revoke_permissions(&self) -> Result<()>;
}

/// JSON-RPC wallet provider over HTTP.
pub struct HttpWallet {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl HttpWallet {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        debug!(method, "wallet RPC request");
        let body: Value = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = body.get("error") {
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(-32000);
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown wallet error")
                .to_string();
            return Err(Error::WalletRpc { code, message });
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl WalletProvider for HttpWallet {
    async fn accounts(&self) -> Result<Vec<String>> {
        let result = self.rpc("eth_accounts", json!([])).await?;
        Ok(decode_accounts(&result))
    }

    async fn request_accounts(&self) -> Result<Vec<String>> {
        let result = self.rpc("eth_requestAccounts", json!([])).await?;
        Ok(decode_accounts(&result))
    }

    async fn chain_id(&self) -> Result<u64> {
        let result = self.rpc("eth_chainId", json!([])).await?;
        result
            .as_str()
            .and_then(parse_chain_id)
            .ok_or_else(|| Error::QueryError(format!("malformed eth_chainId result: {result}")))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        self.rpc(
            "wallet_switchEthereumChain",
            json!([{ "chainId": format_chain_id(chain_id) }]),
        )
        .await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<()> {
        self.rpc("wallet_addEthereumChain", json!([chain])).await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String> {
        let result = self.rpc("eth_sendTransaction", json!([tx])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::TransactionFailed(format!("malformed tx hash: {result}")))
    }

    async fn revoke_permissions(&self) -> Result<()> {
        self.rpc("wallet_revokePermissions", json!([{ "eth_accounts": {} }]))
            .await?;
        Ok(())
    }
}

fn decode_accounts(result: &Value) -> Vec<String> {
    result
        .as_array()
        .map(|accounts| {
            accounts
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A change observed on the wallet side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// Exposed accounts changed; an empty list means the wallet disconnected.
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

/// Polls the wallet for account/chain changes and emits events.
pub struct WalletWatcher<W> {
    wallet: Arc<W>,
    poll_interval: Duration,
}

impl<W: WalletProvider + 'static> WalletWatcher<W> {
    pub fn new(wallet: Arc<W>) -> Self {
        Self {
            wallet,
            poll_interval: Duration::from_secs(2),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Start watching. The returned subscription owns the background task;
    /// dropping it or calling `close` stops polling.
    pub fn subscribe(&self) -> EventSubscription {
        let wallet = self.wallet.clone();
        let interval = self.poll_interval;
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            let mut last_accounts: Option<Vec<String>> = None;
            let mut last_chain: Option<u64> = None;

            loop {
                match wallet.accounts().await {
                    Ok(accounts) => {
                        if last_accounts.as_ref() != Some(&accounts) {
                            if last_accounts.is_some()
                                && tx.send(WalletEvent::AccountsChanged(accounts.clone())).is_err()
                            {
                                return;
                            }
                            last_accounts = Some(accounts);
                        }
                    }
                    Err(e) => warn!("wallet account poll failed: {e}"),
                }

                match wallet.chain_id().await {
                    Ok(chain) => {
                        if last_chain != Some(chain) {
                            if last_chain.is_some()
                                && tx.send(WalletEvent::ChainChanged(chain)).is_err()
                            {
                                return;
                            }
                            last_chain = Some(chain);
                        }
                    }
                    Err(e) => warn!("wallet chain poll failed: {e}"),
                }

                tokio::time::sleep(interval).await;
            }
        });

        EventSubscription { handle, rx }
    }
}

/// Cancellable wallet-event subscription. Teardown is explicit: `close` (or drop)
/// aborts the polling task so no handler outlives its owner.
pub struct EventSubscription {
    handle: JoinHandle<()>,
    rx: mpsc::UnboundedReceiver<WalletEvent>,
}

impl EventSubscription {
    /// Receive the next event; `None` after the subscription is closed.
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        self.rx.recv().await
    }

    pub fn close(self) {
        self.handle.abort();
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
