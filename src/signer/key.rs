//! In-memory secp256k1 soft-key signature provider
//!
//! Keys are imported from WIF strings and addressed by their legacy `EOS..`
//! public key form. Signatures are recoverable ECDSA over 32-byte digests,
//! low-S normalized, formatted as `SIG_K1_..`.

use std::collections::BTreeMap;

use k256::ecdsa::{RecoveryId, SigningKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use super::SignatureProvider;
use crate::error::Error;

const LEGACY_KEY_PREFIX: &str = "EOS";
const PUBLIC_KEY_PREFIX: &str = "PUB_K1_";
const SIGNATURE_PREFIX: &str = "SIG_K1_";
const K1_SUFFIX: &[u8] = b"K1";

fn ripemd_checksum(payload: &[u8], suffix: &[u8]) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.update(payload);
    hasher.update(suffix);
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

fn base58check_encode(payload: &[u8], suffix: &[u8]) -> String {
    let checksum = ripemd_checksum(payload, suffix);
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum);
    bs58::encode(data).into_string()
}

fn base58check_decode(text: &str, payload_len: usize, suffix: &[u8]) -> Result<Vec<u8>, Error> {
    let data = bs58::decode(text)
        .into_vec()
        .map_err(|_| Error::key(format!("\"{}\" is not valid base58", text)))?;
    if data.len() != payload_len + 4 {
        return Err(Error::key(format!(
            "\"{}\" has length {}, expected {}",
            text,
            data.len(),
            payload_len + 4
        )));
    }
    let (payload, checksum) = data.split_at(payload_len);
    if ripemd_checksum(payload, suffix) != checksum {
        return Err(Error::key(format!("\"{}\" has a bad checksum", text)));
    }
    Ok(payload.to_vec())
}

/// Format a compressed public key in the legacy `EOS..` form.
pub(crate) fn legacy_public_key_string(key: &[u8; 33]) -> String {
    format!("{}{}", LEGACY_KEY_PREFIX, base58check_encode(key, b""))
}

/// Parse a public key string in either `EOS..` or `PUB_K1_..` form.
pub(crate) fn public_key_bytes(text: &str) -> Result<[u8; 33], Error> {
    let payload = if let Some(rest) = text.strip_prefix(PUBLIC_KEY_PREFIX) {
        base58check_decode(rest, 33, K1_SUFFIX)?
    } else if let Some(rest) = text.strip_prefix(LEGACY_KEY_PREFIX) {
        base58check_decode(rest, 33, b"")?
    } else {
        return Err(Error::key(format!(
            "unsupported public key format: \"{}\"",
            text
        )));
    };
    let mut key = [0u8; 33];
    key.copy_from_slice(&payload);
    Ok(key)
}

/// Format a 65-byte recoverable signature as `SIG_K1_..`.
pub(crate) fn signature_string(signature: &[u8; 65]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, base58check_encode(signature, K1_SUFFIX))
}

/// Parse a `SIG_K1_..` signature string.
pub(crate) fn signature_bytes(text: &str) -> Result<[u8; 65], Error> {
    let rest = text.strip_prefix(SIGNATURE_PREFIX).ok_or_else(|| {
        Error::key(format!("unsupported signature format: \"{}\"", text))
    })?;
    let payload = base58check_decode(rest, 65, K1_SUFFIX)?;
    let mut sig = [0u8; 65];
    sig.copy_from_slice(&payload);
    Ok(sig)
}

fn sha256d_checksum(payload: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    [second[0], second[1], second[2], second[3]]
}

fn signing_key_from_wif(wif: &str) -> Result<SigningKey, Error> {
    let data = bs58::decode(wif)
        .into_vec()
        .map_err(|_| Error::key("private key is not valid base58"))?;
    // 0x80 prefix + 32-byte secret (+ optional 0x01 compression flag) + 4-byte checksum.
    if data.len() != 37 && data.len() != 38 {
        return Err(Error::key("private key has an unexpected length"));
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    if sha256d_checksum(payload) != checksum {
        return Err(Error::key("private key has a bad checksum"));
    }
    if payload[0] != 0x80 {
        return Err(Error::key("private key has an unexpected version byte"));
    }
    SigningKey::from_slice(&payload[1..33])
        .map_err(|_| Error::key("private key is not a valid secp256k1 scalar"))
}

/// Signature provider backed by an in-memory set of secp256k1 keys.
#[derive(Debug, Default)]
pub struct KeySigner {
    keys: BTreeMap<String, SigningKey>,
}

impl KeySigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signer holding a single WIF-imported key.
    pub fn from_wif(wif: &str) -> Result<Self, Error> {
        let mut signer = Self::new();
        signer.import_key(wif)?;
        Ok(signer)
    }

    /// Import a WIF private key and return its legacy public key string.
    pub fn import_key(&mut self, wif: &str) -> Result<String, Error> {
        let key = signing_key_from_wif(wif)?;
        let point = key.verifying_key().to_encoded_point(true);
        let mut compressed = [0u8; 33];
        compressed.copy_from_slice(point.as_bytes());
        let public = legacy_public_key_string(&compressed);
        self.keys.insert(public.clone(), key);
        Ok(public)
    }

    fn sign_digest(key: &SigningKey, digest: &[u8; 32]) -> Result<String, Error> {
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(digest)
            .map_err(|e| Error::key(format!("signing failed: {}", e)))?;
        // Low-S form; flipping S mirrors the recovery id parity.
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => {
                let flipped = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                    .ok_or_else(|| Error::key("recovery id out of range"))?;
                (normalized, flipped)
            }
            None => (signature, recovery_id),
        };
        let mut compact = [0u8; 65];
        compact[0] = 27 + 4 + recovery_id.to_byte();
        compact[1..].copy_from_slice(&signature.to_bytes());
        Ok(signature_string(&compact))
    }
}

impl SignatureProvider for KeySigner {
    async fn available_keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.keys.keys().cloned().collect())
    }

    async fn sign(
        &self,
        digests: &[[u8; 32]],
        required_keys: &[String],
    ) -> Result<Vec<String>, Error> {
        let mut signatures = Vec::with_capacity(digests.len() * required_keys.len());
        for digest in digests {
            for public in required_keys {
                let key = self.keys.get(public).ok_or_else(|| {
                    Error::key(format!("no private key available for \"{}\"", public))
                })?;
                signatures.push(Self::sign_digest(key, digest)?);
            }
        }
        Ok(signatures)
    }
}
