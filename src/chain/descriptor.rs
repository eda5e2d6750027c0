//! Chain descriptors
//!
//! A `ChainDescriptor` carries everything `wallet_addEthereumChain` needs to add a
//! network to a wallet: chain id, display name, native currency and RPC endpoints.
//! Serialized camelCase to match the EIP-3085 parameter object.

use serde::{Deserialize, Serialize};

/// Sepolia testnet chain id. The demo contract is deployed there.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// Numeric chain identifier. Hex-encoded on the wire via `chain_id_hex`.
    #[serde(skip)]
    pub chain_id: u64,

    /// Hex form required by `wallet_addEthereumChain` / `wallet_switchEthereumChain`.
    #[serde(rename = "chainId")]
    pub chain_id_hex: String,

    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl ChainDescriptor {
    pub fn new(
        chain_id: u64,
        name: impl Into<String>,
        currency: NativeCurrency,
        rpc_urls: Vec<String>,
        block_explorer_urls: Vec<String>,
    ) -> Self {
        Self {
            chain_id,
            chain_id_hex: format_chain_id(chain_id),
            chain_name: name.into(),
            native_currency: currency,
            rpc_urls,
            block_explorer_urls,
        }
    }

    /// Sepolia test network, the chain the demo expects by default.
    pub fn sepolia() -> Self {
        Self::new(
            SEPOLIA_CHAIN_ID,
            "Sepolia",
            NativeCurrency {
                name: "Sepolia Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            vec!["https://rpc.sepolia.org".to_string()],
            vec!["https://sepolia.etherscan.io".to_string()],
        )
    }

    /// Look up a descriptor for a chain id the app knows about.
    pub fn known(chain_id: u64) -> Option<Self> {
        match chain_id {
            SEPOLIA_CHAIN_ID => Some(Self::sepolia()),
            _ => None,
        }
    }
}

/// Format a chain id the way wallet RPC methods expect: 0x-prefixed hex,
/// no leading zeroes.
pub fn format_chain_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// Parse an `eth_chainId` result ("0xaa36a7") back into a number.
pub fn parse_chain_id(hex_id: &str) -> Option<u64> {
    u64::from_str_radix(hex_id.trim_start_matches("0x"), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sepolia_chain_id_formats_as_expected_hex() {
        assert_eq!(format_chain_id(SEPOLIA_CHAIN_ID), "0xaa36a7");
        assert_eq!(parse_chain_id("0xaa36a7"), Some(SEPOLIA_CHAIN_ID));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_chain_id("0xzz"), None);
        assert_eq!(parse_chain_id(""), None);
    }

    #[test]
    fn descriptor_serializes_to_eip3085_shape() {
        let chain = ChainDescriptor::sepolia();
        let value = serde_json::to_value(&chain).unwrap();

        assert_eq!(value["chainId"], "0xaa36a7");
        assert_eq!(value["chainName"], "Sepolia");
        assert_eq!(value["nativeCurrency"]["symbol"], "ETH");
        assert_eq!(value["nativeCurrency"]["decimals"], 18);
        assert!(value["rpcUrls"].as_array().is_some());
        assert!(value["blockExplorerUrls"].as_array().is_some());
        // The numeric id is internal only.
        assert!(value.get("chain_id").is_none());
    }
}
