//! Transaction processor: the prepare/sign/broadcast state machine
//!
//! One processor instance drives one transaction attempt. The four
//! collaborators (serialization, ABI lookup, RPC, signing) are injected as
//! trait implementations; the processor owns the in-flight transaction state
//! and never retries a broadcast on its own.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

use crate::abi::serializer::{self, SerializationProvider};
use crate::abi::{name, Abi};
use crate::abi_provider::AbiProvider;
use crate::config::ChainConfig;
use crate::constants::{ref_block_num, CHECKSUM256_BYTES, COMPRESSION_NONE};
use crate::error::Error;
use crate::rpc::{
    ActionTrace, GetRequiredKeysRequest, RpcProvider, SendTransactionResponse,
};
use crate::signer::SignatureProvider;
use crate::types::{Action, ActionData, EncodedAction, PackedTransaction, Transaction};

/// Lifecycle of a processor instance.
enum State {
    Initialized,
    Prepared(Box<Prepared>),
    /// Broadcast was attempted (successfully or not); the instance is spent.
    Broadcast,
}

/// Everything assembled by `prepare`, retained until broadcast.
struct Prepared {
    chain_id: String,
    transaction: Transaction,
    actions: Vec<Action>,
    abis: Vec<Arc<Abi>>,
}

/// Orchestrates one transaction through prepare, sign, and broadcast.
///
/// Use one instance per transaction attempt; concurrent use of a single
/// instance is not supported.
pub struct TransactionProcessor<P, R, A, S>
where
    P: SerializationProvider,
    R: RpcProvider,
    A: AbiProvider,
    S: SignatureProvider,
{
    serializer: P,
    rpc: Arc<R>,
    abi_provider: A,
    signer: S,
    config: ChainConfig,
    state: State,
}

impl<P, R, A, S> TransactionProcessor<P, R, A, S>
where
    P: SerializationProvider,
    R: RpcProvider,
    A: AbiProvider,
    S: SignatureProvider,
{
    pub fn new(serializer: P, rpc: Arc<R>, abi_provider: A, signer: S, config: ChainConfig) -> Self {
        Self {
            serializer,
            rpc,
            abi_provider,
            signer,
            config,
            state: State::Initialized,
        }
    }

    /// Resolve reference block data, encode every action per its contract's
    /// ABI, and assemble the transaction.
    ///
    /// Atomic: on any failure the processor stays in its initial state with
    /// no partial transaction retained. Calling `prepare` a second time on
    /// the same instance is rejected.
    pub async fn prepare(&mut self, actions: Vec<Action>) -> Result<(), Error> {
        if !matches!(self.state, State::Initialized) {
            return Err(Error::invalid_state(
                "prepare may only be called once per processor instance",
            ));
        }
        if actions.is_empty() {
            return Err(Error::prepare("action list is empty", None));
        }

        let prepared = self.assemble(actions).await?;
        debug!(
            actions = prepared.transaction.actions.len(),
            expiration = %prepared.transaction.expiration,
            "transaction prepared"
        );
        self.state = State::Prepared(Box::new(prepared));
        Ok(())
    }

    async fn assemble(&self, actions: Vec<Action>) -> Result<Prepared, Error> {
        let info = self
            .rpc
            .get_info()
            .await
            .map_err(|e| Error::prepare("could not fetch chain info", Some(e)))?;

        let reference = if self.config.use_last_irreversible {
            info.last_irreversible_block_num
        } else {
            info.head_block_num
                .saturating_sub(u64::from(self.config.blocks_behind))
        };
        let block = self
            .rpc
            .get_block(&reference.to_string())
            .await
            .map_err(|e| Error::prepare("could not fetch the reference block", Some(e)))?;

        let expiration = name::add_seconds(&info.head_block_time, self.config.expire_seconds)
            .map_err(|e| Error::prepare("could not compute expiration", Some(e)))?;

        let mut encoded = Vec::with_capacity(actions.len());
        let mut abis = Vec::with_capacity(actions.len());
        for action in &actions {
            let abi = self
                .abi_provider
                .get_abi(&action.account)
                .await
                .map_err(|e| {
                    Error::prepare(format!("ABI lookup failed for {}", action.account), Some(e))
                })?;
            let data = match &action.data {
                ActionData::Raw(bytes) => bytes.clone(),
                ActionData::Json(value) => {
                    let action_type = abi.action_type(&action.name).ok_or_else(|| {
                        Error::prepare(
                            format!(
                                "ABI of {} declares no action named {}",
                                action.account, action.name
                            ),
                            None,
                        )
                    })?;
                    self.serializer
                        .serialize(action_type, value, &abi)
                        .map_err(|e| {
                            Error::prepare(
                                format!(
                                    "could not encode data of action {}::{}",
                                    action.account, action.name
                                ),
                                Some(e),
                            )
                        })?
                }
            };
            encoded.push(EncodedAction {
                account: action.account.clone(),
                name: action.name.clone(),
                authorization: action.authorization.clone(),
                data,
            });
            abis.push(abi);
        }

        let transaction = Transaction {
            expiration,
            ref_block_num: ref_block_num(block.block_num),
            ref_block_prefix: block.ref_block_prefix,
            max_net_usage_words: self.config.max_net_usage_words,
            max_cpu_usage_ms: self.config.max_cpu_usage_ms,
            delay_sec: self.config.delay_sec,
            context_free_actions: vec![],
            actions: encoded,
            transaction_extensions: vec![],
        };
        Ok(Prepared {
            chain_id: info.chain_id,
            transaction,
            actions,
            abis,
        })
    }

    /// Sign the prepared transaction and push it to the node.
    ///
    /// Exactly one broadcast attempt is made per call. A signing failure
    /// leaves the processor in `Prepared` (nothing was sent); once a push is
    /// attempted the instance is spent either way, so a rejected transaction
    /// cannot be accidentally re-broadcast.
    pub async fn sign_and_broadcast(&mut self) -> Result<TransactionResult, Error> {
        let prepared = match std::mem::replace(&mut self.state, State::Broadcast) {
            State::Prepared(prepared) => prepared,
            other => {
                self.state = other;
                return Err(Error::invalid_state(
                    "sign_and_broadcast requires a prepared transaction",
                ));
            }
        };

        let packed = match self.sign(&prepared).await {
            Ok(packed) => packed,
            Err(e) => {
                // No network write happened; the prepared transaction is
                // still valid and the caller may retry explicitly.
                self.state = State::Prepared(prepared);
                return Err(e);
            }
        };

        let response = self
            .rpc
            .push_transaction(&packed)
            .await
            .map_err(|e| Error::broadcast("node rejected the transaction", Some(e)))?;
        info!(transaction_id = %response.transaction_id, "transaction broadcast");

        Ok(TransactionResult {
            response,
            actions: prepared.actions,
            abis: prepared.abis,
        })
    }

    async fn sign(&self, prepared: &Prepared) -> Result<PackedTransaction, Error> {
        let packed_trx = self
            .serializer
            .serialize_transaction(&prepared.transaction)
            .map_err(|e| Error::sign("could not pack the transaction", Some(e)))?;

        let available_keys = self
            .signer
            .available_keys()
            .await
            .map_err(|e| Error::sign("signature provider has no keys", Some(e)))?;
        let required = self
            .rpc
            .get_required_keys(&GetRequiredKeysRequest {
                transaction: prepared.transaction.clone(),
                available_keys,
            })
            .await
            .map_err(|e| Error::sign("could not resolve required keys", Some(e)))?
            .required_keys;
        if required.is_empty() {
            return Err(Error::sign(
                "node reported no signable keys for this transaction",
                None,
            ));
        }

        let digest = signing_digest(&prepared.chain_id, &packed_trx)?;
        let signatures = self
            .signer
            .sign(&[digest], &required)
            .await
            .map_err(|e| Error::sign("signature provider failed", Some(e)))?;
        if signatures.is_empty() {
            return Err(Error::sign("signature provider returned no signatures", None));
        }

        Ok(PackedTransaction {
            signatures,
            compression: COMPRESSION_NONE,
            packed_context_free_data: String::new(),
            packed_trx: hex::encode(packed_trx),
        })
    }
}

/// Digest that gets signed: `sha256(chain_id + packed_trx + 32 zero bytes)`,
/// the trailing zeros standing in for empty context-free data.
fn signing_digest(chain_id: &str, packed_trx: &[u8]) -> Result<[u8; 32], Error> {
    let chain_id_bytes = hex::decode(chain_id)
        .map_err(|_| Error::sign("chain id is not valid hex", None))?;
    if chain_id_bytes.len() != CHECKSUM256_BYTES {
        return Err(Error::sign("chain id must be 32 bytes", None));
    }
    let mut hasher = Sha256::new();
    hasher.update(&chain_id_bytes);
    hasher.update(packed_trx);
    hasher.update([0u8; CHECKSUM256_BYTES]);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// Outcome of a successful broadcast: the node's response plus everything
/// needed to decode per-action return values on demand.
pub struct TransactionResult {
    response: SendTransactionResponse,
    actions: Vec<Action>,
    abis: Vec<Arc<Abi>>,
}

impl TransactionResult {
    pub fn transaction_id(&self) -> &str {
        &self.response.transaction_id
    }

    /// The node's full execution trace.
    pub fn response(&self) -> &SendTransactionResponse {
        &self.response
    }

    /// Traces of the caller's actions, in prepared order. Inline actions
    /// spawned during execution are excluded so indices line up.
    fn top_level_traces(&self) -> impl Iterator<Item = &ActionTrace> {
        self.response
            .processed
            .action_traces
            .iter()
            .filter(|t| t.creator_action_ordinal == 0)
    }

    /// Console output produced by the action at `index`.
    pub fn console_at(&self, index: usize) -> Result<&str, Error> {
        if index >= self.actions.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.actions.len(),
            });
        }
        Ok(self
            .top_level_traces()
            .nth(index)
            .map(|t| t.console.as_str())
            .unwrap_or(""))
    }

    /// Decode the return value of the action at `index` as `T`.
    ///
    /// The raw return bytes from the trace are decoded against the ABI's
    /// declared result type for that action, then converted through the
    /// fixed [`FromReturnValue`] mapping. Repeated calls with the same
    /// index and type return equal values.
    pub fn action_value_at<T: FromReturnValue>(&self, index: usize) -> Result<T, Error> {
        if index >= self.actions.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.actions.len(),
            });
        }
        let action = &self.actions[index];
        let abi = &self.abis[index];
        let result_type = abi.action_result_type(&action.name).ok_or_else(|| {
            Error::type_mismatch("no declared return type", std::any::type_name::<T>())
        })?;
        let hex_data = self
            .top_level_traces()
            .nth(index)
            .and_then(|t| t.return_value_hex_data.as_deref())
            .ok_or_else(|| {
                Error::type_mismatch("no reported return value", std::any::type_name::<T>())
            })?;
        let bytes = hex::decode(hex_data)
            .map_err(|_| Error::serialization("return value is not valid hex"))?;
        let value = serializer::decode(abi, result_type, &bytes)?;
        T::from_return(abi.resolve_type(result_type), &value)
    }
}

/// Fixed mapping from decoded ABI values to caller-facing types.
///
/// Each implementation accepts a closed set of ABI types; anything else is
/// a `TypeMismatch`, never an implicit coercion.
pub trait FromReturnValue: Sized {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error>;
}

fn mismatch<T>(abi_type: &str) -> Error {
    Error::type_mismatch(abi_type, std::any::type_name::<T>())
}

impl FromReturnValue for f64 {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "float64" | "float32" => value.as_f64().ok_or_else(|| mismatch::<f64>(abi_type)),
            _ => Err(mismatch::<f64>(abi_type)),
        }
    }
}

impl FromReturnValue for f32 {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "float32" => value
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| mismatch::<f32>(abi_type)),
            _ => Err(mismatch::<f32>(abi_type)),
        }
    }
}

impl FromReturnValue for u64 {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "uint8" | "uint16" | "uint32" | "uint64" | "varuint32" => {
                value.as_u64().ok_or_else(|| mismatch::<u64>(abi_type))
            }
            _ => Err(mismatch::<u64>(abi_type)),
        }
    }
}

impl FromReturnValue for u32 {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "uint8" | "uint16" | "uint32" | "varuint32" => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| mismatch::<u32>(abi_type)),
            _ => Err(mismatch::<u32>(abi_type)),
        }
    }
}

impl FromReturnValue for i64 {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "int8" | "int16" | "int32" | "int64" | "varint32" => {
                value.as_i64().ok_or_else(|| mismatch::<i64>(abi_type))
            }
            "uint8" | "uint16" | "uint32" | "varuint32" => value
                .as_u64()
                .and_then(|v| i64::try_from(v).ok())
                .ok_or_else(|| mismatch::<i64>(abi_type)),
            _ => Err(mismatch::<i64>(abi_type)),
        }
    }
}

impl FromReturnValue for i32 {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "int8" | "int16" | "int32" | "varint32" => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| mismatch::<i32>(abi_type)),
            "uint8" | "uint16" => value
                .as_u64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| mismatch::<i32>(abi_type)),
            _ => Err(mismatch::<i32>(abi_type)),
        }
    }
}

impl FromReturnValue for bool {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "bool" => value.as_bool().ok_or_else(|| mismatch::<bool>(abi_type)),
            _ => Err(mismatch::<bool>(abi_type)),
        }
    }
}

impl FromReturnValue for String {
    fn from_return(abi_type: &str, value: &Value) -> Result<Self, Error> {
        match abi_type {
            "string" | "name" | "symbol" | "symbol_code" | "asset" | "checksum160"
            | "checksum256" | "checksum512" => value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| mismatch::<String>(abi_type)),
            _ => Err(mismatch::<String>(abi_type)),
        }
    }
}

impl FromReturnValue for Value {
    fn from_return(_abi_type: &str, value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}
