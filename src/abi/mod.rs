//! Contract ABI model and codecs
//!
//! An [`Abi`] describes a contract's types, actions, tables, and action return
//! values. It is fetched from the node either as JSON or in the node's packed
//! binary form (`get_raw_abi`), and drives the [`serializer`] codec that turns
//! human-readable action payloads into the chain's binary encoding and back.

pub mod bytes;
pub mod name;
pub mod serializer;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use self::bytes::ByteReader;

/// A type alias entry: `new_type_name` resolves to `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub new_type_name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// One field of a struct definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// A struct definition, possibly inheriting fields from `base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Maps an action name to the struct type of its payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub ricardian_contract: String,
}

/// A contract table and the type of its rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub index_type: String,
    #[serde(default)]
    pub key_names: Vec<String>,
    #[serde(default)]
    pub key_types: Vec<String>,
    #[serde(rename = "type")]
    pub type_: String,
}

/// A ricardian clause attached to the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClausePair {
    pub id: String,
    pub body: String,
}

/// A custom error message for an on-chain error code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error_code: u64,
    pub error_msg: String,
}

/// A variant (tagged union) definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDef {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Maps an action name to the ABI type of its return value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResultDef {
    pub name: String,
    pub result_type: String,
}

/// A contract's versioned schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Abi {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub ricardian_clauses: Vec<ClausePair>,
    #[serde(default)]
    pub error_messages: Vec<ErrorMessage>,
    #[serde(default)]
    pub abi_extensions: Vec<(u16, String)>,
    #[serde(default)]
    pub variants: Vec<VariantDef>,
    #[serde(default)]
    pub action_results: Vec<ActionResultDef>,
}

impl Abi {
    /// The payload struct type of an action, if the ABI declares it.
    pub fn action_type(&self, action: &str) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.name == action)
            .map(|a| a.type_.as_str())
    }

    /// The declared return value type of an action, if any.
    pub fn action_result_type(&self, action: &str) -> Option<&str> {
        self.action_results
            .iter()
            .find(|r| r.name == action)
            .map(|r| r.result_type.as_str())
    }

    /// The row type of a table, if the ABI declares it.
    pub fn table_type(&self, table: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.type_.as_str())
    }

    /// Chase typedef aliases to the underlying type name. Alias loops are
    /// cut off rather than followed forever.
    pub fn resolve_type<'a>(&'a self, type_name: &'a str) -> &'a str {
        let mut current = type_name;
        for _ in 0..self.types.len() + 1 {
            match self.types.iter().find(|t| t.new_type_name == current) {
                Some(alias) => current = alias.type_.as_str(),
                None => break,
            }
        }
        current
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_variant(&self, name: &str) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Decode the node's packed binary ABI (`get_raw_abi` payload).
    ///
    /// Trailing sections are binary extensions: ABIs packed by older
    /// toolchains simply stop early, so each section past the version is
    /// read only while bytes remain.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let mut r = ByteReader::new(data);
        let mut abi = Abi {
            version: r.read_string()?,
            ..Default::default()
        };
        if !abi.version.starts_with("eosio::abi/1.") {
            return Err(Error::serialization(format!(
                "unsupported ABI version \"{}\"",
                abi.version
            )));
        }

        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                abi.types.push(TypeDef {
                    new_type_name: r.read_string()?,
                    type_: r.read_string()?,
                });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                let name = r.read_string()?;
                let base = r.read_string()?;
                let mut fields = Vec::new();
                for _ in 0..r.read_varuint32()? {
                    fields.push(FieldDef {
                        name: r.read_string()?,
                        type_: r.read_string()?,
                    });
                }
                abi.structs.push(StructDef { name, base, fields });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                abi.actions.push(ActionDef {
                    name: name::name_from_u64(r.read_u64()?),
                    type_: r.read_string()?,
                    ricardian_contract: r.read_string()?,
                });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                let table_name = name::name_from_u64(r.read_u64()?);
                let index_type = r.read_string()?;
                let mut key_names = Vec::new();
                for _ in 0..r.read_varuint32()? {
                    key_names.push(r.read_string()?);
                }
                let mut key_types = Vec::new();
                for _ in 0..r.read_varuint32()? {
                    key_types.push(r.read_string()?);
                }
                abi.tables.push(TableDef {
                    name: table_name,
                    index_type,
                    key_names,
                    key_types,
                    type_: r.read_string()?,
                });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                abi.ricardian_clauses.push(ClausePair {
                    id: r.read_string()?,
                    body: r.read_string()?,
                });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                abi.error_messages.push(ErrorMessage {
                    error_code: r.read_u64()?,
                    error_msg: r.read_string()?,
                });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                let tag = r.read_u16()?;
                let payload = r.read_var_bytes()?;
                abi.abi_extensions.push((tag, hex::encode(payload)));
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                let variant_name = r.read_string()?;
                let mut types = Vec::new();
                for _ in 0..r.read_varuint32()? {
                    types.push(r.read_string()?);
                }
                abi.variants.push(VariantDef {
                    name: variant_name,
                    types,
                });
            }
        }
        if !r.is_empty() {
            for _ in 0..r.read_varuint32()? {
                abi.action_results.push(ActionResultDef {
                    name: name::name_from_u64(r.read_u64()?),
                    result_type: r.read_string()?,
                });
            }
        }
        Ok(abi)
    }
}
