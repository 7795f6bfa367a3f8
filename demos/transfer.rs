//! Token transfer demo
//!
//! Run with: cargo run --example transfer
//!
//! Requires ANTELOPE_NODE_URL and ANTELOPE_PRIVATE_KEY environment variables.

use std::sync::Arc;

use antelope_sdk::{
    extract_backend_error, format_backend_message, AbiSerializer, Action, Authorization,
    CachedAbiProvider, ChainConfig, HttpRpcProvider, KeySigner, TransactionProcessor,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ChainConfig::from_env()?;
    let private_key =
        std::env::var("ANTELOPE_PRIVATE_KEY").expect("ANTELOPE_PRIVATE_KEY must be set");

    let rpc = Arc::new(HttpRpcProvider::with_timeout(
        &config.node_url,
        config.http_timeout,
    )?);
    let signer = KeySigner::from_wif(&private_key)?;
    let mut processor = TransactionProcessor::new(
        AbiSerializer::new(),
        rpc.clone(),
        CachedAbiProvider::new(rpc),
        signer,
        config,
    );

    let action = Action::new(
        "eosio.token",
        "transfer",
        vec![Authorization::active("bob")],
        serde_json::json!({
            "from": "bob",
            "to": "alice",
            "quantity": "1.1234 SYS",
            "memo": "hello"
        }),
    );

    processor.prepare(vec![action]).await?;
    match processor.sign_and_broadcast().await {
        Ok(result) => {
            println!("Finished! Your transaction id is: {}", result.transaction_id());
            let console = result.console_at(0)?;
            if !console.is_empty() {
                println!("Console output: {}", console);
            }
        }
        Err(e) => {
            // Distinguish a node rejection from an infrastructure failure.
            if let Some(backend) = extract_backend_error(&e) {
                eprintln!("Rejected by the node: {}", format_backend_message(backend));
            }
            return Err(e.into());
        }
    }

    Ok(())
}
