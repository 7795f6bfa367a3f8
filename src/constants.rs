//! Chain constants and small helpers for the Antelope SDK

/// Default transaction expiration window, in seconds past the head block time.
pub const DEFAULT_EXPIRE_SECONDS: u32 = 300;

/// Default number of blocks behind head used for the reference block when
/// TAPOS is not anchored to the last irreversible block.
pub const DEFAULT_BLOCKS_BEHIND: u16 = 3;

/// `compression` field value for an uncompressed packed transaction.
pub const COMPRESSION_NONE: u8 = 0;

/// Maximum length of an account/action/table name (12 chars + 4-bit 13th).
pub const MAX_NAME_LENGTH: usize = 13;

/// Maximum decimal precision of an asset amount.
pub const MAX_ASSET_PRECISION: u8 = 18;

/// Delimiter used when flattening a backend error into one message line.
pub const BACKEND_ERROR_DELIMITER: &str = " - ";

/// Size in bytes of a chain id / signing checksum.
pub const CHECKSUM256_BYTES: usize = 32;

/// TAPOS reference block number: the low 16 bits of the block number.
pub fn ref_block_num(block_num: u64) -> u16 {
    (block_num & 0xffff) as u16
}
