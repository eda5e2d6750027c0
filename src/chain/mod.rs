//! Chain-side bindings: descriptors, the wallet provider and the provenance
//! contract client.

mod contract;
mod descriptor;
mod wallet;

pub use contract::{
    encode_string_call, ContractClient, DocumentRecord, ProvenanceContract, ZERO_ADDRESS,
};
pub use descriptor::{
    format_chain_id, parse_chain_id, ChainDescriptor, NativeCurrency, SEPOLIA_CHAIN_ID,
};
pub use wallet::{
    EventSubscription, HttpWallet, TransactionRequest, WalletEvent, WalletProvider, WalletWatcher,
};
