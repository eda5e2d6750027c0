//! HTTP-level tests for the wallet and contract JSON-RPC bindings.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trustify::chain::{
    ChainDescriptor, ContractClient, HttpWallet, ProvenanceContract, WalletProvider,
};
use trustify::error::Error;

fn rpc_result(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": value,
    }))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message},
    }))
}

#[tokio::test]
async fn chain_id_parses_hex_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_chainId"})))
        .respond_with(rpc_result(json!("0xaa36a7")))
        .mount(&server)
        .await;

    let wallet = HttpWallet::new(server.uri());
    assert_eq!(wallet.chain_id().await.unwrap(), 11155111);
}

#[tokio::test]
async fn switch_chain_error_preserves_eip1193_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "wallet_switchEthereumChain"})))
        .respond_with(rpc_error(4902, "Unrecognized chain ID"))
        .mount(&server)
        .await;

    let wallet = HttpWallet::new(server.uri());
    let err = wallet.switch_chain(11155111).await.unwrap_err();
    assert!(err.is_unrecognized_chain());
    match err {
        Error::WalletRpc { code, message } => {
            assert_eq!(code, 4902);
            assert_eq!(message, "Unrecognized chain ID");
        }
        other => panic!("expected WalletRpc, got {other:?}"),
    }
}

#[tokio::test]
async fn add_chain_sends_eip3085_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "wallet_addEthereumChain",
            "params": [{
                "chainId": "0xaa36a7",
                "chainName": "Sepolia",
            }],
        })))
        .respond_with(rpc_result(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let wallet = HttpWallet::new(server.uri());
    wallet.add_chain(&ChainDescriptor::sepolia()).await.unwrap();
}

#[tokio::test]
async fn disconnect_revokes_account_permissions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "wallet_revokePermissions",
            "params": [{"eth_accounts": {}}],
        })))
        .respond_with(rpc_result(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let wallet = HttpWallet::new(server.uri());
    wallet.revoke_permissions().await.unwrap();
}

#[tokio::test]
async fn upload_document_submits_and_awaits_receipt() {
    let server = MockServer::start().await;

    Mock::given(body_partial_json(json!({"method": "eth_accounts"})))
        .respond_with(rpc_result(json!(["0x00000000000000000000000000000000000000a1"])))
        .mount(&server)
        .await;
    Mock::given(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!("0xdeadbeef")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(body_partial_json(json!({
        "method": "eth_getTransactionReceipt",
        "params": ["0xdeadbeef"],
    })))
    .respond_with(rpc_result(json!({"status": "0x1", "transactionHash": "0xdeadbeef"})))
    .mount(&server)
    .await;

    let wallet = Arc::new(HttpWallet::new(server.uri()));
    let contract = ProvenanceContract::new(
        wallet,
        server.uri(),
        "0x5fbdb2315678afecb367f032d93f642f64180aa3",
    )
    .with_receipt_poll_interval(Duration::from_millis(10));

    let tx_hash = contract.upload_document("QmDeed").await.unwrap();
    assert_eq!(tx_hash, "0xdeadbeef");
}

#[tokio::test]
async fn reverted_transaction_is_a_transaction_failure() {
    let server = MockServer::start().await;

    Mock::given(body_partial_json(json!({"method": "eth_accounts"})))
        .respond_with(rpc_result(json!(["0x00000000000000000000000000000000000000a1"])))
        .mount(&server)
        .await;
    Mock::given(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!("0xbad")))
        .mount(&server)
        .await;
    Mock::given(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!({"status": "0x0"})))
        .mount(&server)
        .await;

    let wallet = Arc::new(HttpWallet::new(server.uri()));
    let contract = ProvenanceContract::new(
        wallet,
        server.uri(),
        "0x5fbdb2315678afecb367f032d93f642f64180aa3",
    )
    .with_receipt_poll_interval(Duration::from_millis(10));

    let err = contract.upload_document("QmDeed").await.unwrap_err();
    assert!(matches!(err, Error::TransactionFailed(_)));
}

#[tokio::test]
async fn verify_document_decodes_eth_call_result() {
    let server = MockServer::start().await;

    let owner = "abcabcabcabcabcabcabcabcabcabcabcabcabca";
    let mut result = String::from("0x");
    result.push_str(&"0".repeat(24));
    result.push_str(owner);
    result.push_str(&format!("{:064x}", 1_700_000_000u64));

    Mock::given(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_result(json!(result)))
        .mount(&server)
        .await;

    let wallet = Arc::new(HttpWallet::new(server.uri()));
    let contract = ProvenanceContract::new(
        wallet,
        server.uri(),
        "0x5fbdb2315678afecb367f032d93f642f64180aa3",
    );

    let record = contract.verify_document("QmDeed").await.unwrap();
    assert_eq!(record.owner, format!("0x{owner}"));
    assert_eq!(record.timestamp, 1_700_000_000);
}

#[tokio::test]
async fn rpc_error_on_verify_is_a_query_error() {
    let server = MockServer::start().await;
    Mock::given(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_error(-32000, "execution reverted"))
        .mount(&server)
        .await;

    let wallet = Arc::new(HttpWallet::new(server.uri()));
    let contract = ProvenanceContract::new(
        wallet,
        server.uri(),
        "0x5fbdb2315678afecb367f032d93f642f64180aa3",
    );

    let err = contract.verify_document("QmDeed").await.unwrap_err();
    match err {
        Error::QueryError(message) => assert_eq!(message, "execution reverted"),
        other => panic!("expected QueryError, got {other:?}"),
    }
}
