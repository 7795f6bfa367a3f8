//! Antelope SDK for Rust
//!
//! A client library for submitting signed transactions to Antelope (EOSIO)
//! blockchain nodes and querying their state.
//!
//! # Features
//!
//! - Prepare / sign / broadcast pipeline with a strict one-shot state machine
//! - ABI-driven binary encoding of action data and decoding of return values
//! - Pluggable serialization, ABI lookup, RPC, and signature providers
//! - Structured backend errors recoverable from any layer of the error chain
//!
//! # Example
//!
//! ```rust,ignore
//! use antelope_sdk::{
//!     Action, Authorization, AbiSerializer, CachedAbiProvider, ChainConfig,
//!     HttpRpcProvider, KeySigner, TransactionProcessor, extract_backend_error,
//!     format_backend_message,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let config = ChainConfig::from_env()?;
//!     let rpc = Arc::new(HttpRpcProvider::new(&config.node_url)?);
//!     let signer = KeySigner::from_wif("5K...")?;
//!     let mut processor = TransactionProcessor::new(
//!         AbiSerializer::new(),
//!         rpc.clone(),
//!         CachedAbiProvider::new(rpc),
//!         signer,
//!         config,
//!     );
//!
//!     let action = Action::new(
//!         "eosio.token",
//!         "transfer",
//!         vec![Authorization::active("bob")],
//!         serde_json::json!({
//!             "from": "bob", "to": "alice",
//!             "quantity": "1.1234 SYS", "memo": "hello"
//!         }),
//!     );
//!     processor.prepare(vec![action]).await?;
//!
//!     match processor.sign_and_broadcast().await {
//!         Ok(result) => println!("transaction id: {}", result.transaction_id()),
//!         Err(e) => {
//!             if let Some(backend) = extract_backend_error(&e) {
//!                 eprintln!("rejected: {}", format_backend_message(backend));
//!             }
//!             return Err(e.into());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod abi;
pub mod abi_provider;
pub mod config;
pub mod constants;
pub mod error;
pub mod processor;
pub mod rpc;
pub mod signer;
pub mod types;

// Re-export main types for convenience
pub use abi::serializer::{AbiSerializer, SerializationProvider};
pub use abi::Abi;
pub use abi_provider::{AbiProvider, CachedAbiProvider};
pub use config::ChainConfig;
pub use error::{
    extract_backend_error, find_cause, format_backend_message, Error, RpcResponseError,
};
pub use processor::{FromReturnValue, TransactionProcessor, TransactionResult};
pub use rpc::{
    GetKvTableRowsRequest, GetTableRowsRequest, HttpRpcProvider, RpcProvider,
    SendTransactionResponse,
};
pub use signer::{KeySigner, SignatureProvider};
pub use types::{Action, ActionData, Authorization, PackedTransaction, Transaction};
