//! Runtime configuration
//!
//! All durable state lives in the two external systems (the pinning service and the
//! chain); this is just the set of endpoints and credentials needed to reach them.

use url::Url;

use crate::chain::ChainDescriptor;
use crate::error::{Error, Result};

/// Credentials and endpoint for the Pinata-compatible pinning service.
#[derive(Clone, Debug)]
pub struct PinningConfig {
    /// API base, e.g. "https://api.pinata.cloud"
    pub api_base: String,
    pub api_key: String,
    pub api_secret: String,
    /// Bearer token for the v3 file-listing API.
    pub jwt: String,
    /// Dedicated gateway base for rendering content links, e.g.
    /// "https://example.mypinata.cloud"
    pub gateway_base: Option<String>,
}

/// Endpoints and contract coordinates for the chain side.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the wallet provider (signs and submits).
    pub wallet_rpc_url: String,
    /// Read-only JSON-RPC endpoint used for `eth_call` and receipt polling.
    pub read_rpc_url: String,
    /// Deployed provenance contract address (0x-prefixed).
    pub contract_address: String,
    /// The chain the app expects the wallet to be on.
    pub expected_chain: ChainDescriptor,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pinning: PinningConfig,
    pub chain: ChainConfig,
    /// Optional request timeout. None means every call waits for the external
    /// service to settle, matching the source behavior.
    pub http_timeout: Option<std::time::Duration>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        check_url("pinning API base", &self.pinning.api_base)?;
        check_url("wallet RPC URL", &self.chain.wallet_rpc_url)?;
        check_url("read RPC URL", &self.chain.read_rpc_url)?;
        if let Some(gateway) = &self.pinning.gateway_base {
            check_url("gateway base", gateway)?;
        }
        let addr = &self.chain.contract_address;
        if !addr.starts_with("0x") || addr.len() != 42 {
            return Err(Error::Config(format!(
                "contract address {addr:?} is not a 0x-prefixed 20-byte hex address"
            )));
        }
        if hex::decode(&addr[2..]).is_err() {
            return Err(Error::Config(format!(
                "contract address {addr:?} contains non-hex characters"
            )));
        }
        Ok(())
    }
}

fn check_url(label: &str, value: &str) -> Result<()> {
    Url::parse(value).map_err(|e| Error::Config(format!("{label} {value:?} is invalid: {e}")))?;
    Ok(())
}
