//! Transaction types in their node wire (JSON) shapes

use serde::{Deserialize, Serialize};

use super::Authorization;

/// An action whose payload has been ABI-encoded. On the JSON wire the data
/// travels as a hex string, matching the node's expectations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedAction {
    pub account: String,
    pub name: String,
    pub authorization: Vec<Authorization>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

/// A fully assembled transaction: header fields resolved from the reference
/// block plus the encoded action sequences. The JSON form is what
/// `get_required_keys` consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Expiration timestamp, e.g. `2021-06-01T12:05:00.000`.
    pub expiration: String,
    /// Low 16 bits of the reference block number.
    pub ref_block_num: u16,
    /// Checksum prefix taken from the reference block id.
    pub ref_block_prefix: u32,
    #[serde(default)]
    pub max_net_usage_words: u32,
    #[serde(default)]
    pub max_cpu_usage_ms: u8,
    #[serde(default)]
    pub delay_sec: u32,
    #[serde(default)]
    pub context_free_actions: Vec<EncodedAction>,
    pub actions: Vec<EncodedAction>,
    #[serde(default)]
    pub transaction_extensions: Vec<(u16, String)>,
}

/// The signed, packed form sent to `push_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedTransaction {
    pub signatures: Vec<String>,
    pub compression: u8,
    pub packed_context_free_data: String,
    pub packed_trx: String,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}
