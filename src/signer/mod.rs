//! Signature provider abstraction
//!
//! A trait-based seam so the pipeline can sign with an in-memory key set
//! ([`KeySigner`]) or a remote wallet service without changing the processor.

pub(crate) mod key;

pub use key::KeySigner;

use std::future::Future;

use crate::error::Error;

/// Produces signatures over transaction digests.
///
/// Implementations may hold keys locally or proxy to an external wallet;
/// both operations are async because a provider may be remote.
pub trait SignatureProvider: Send + Sync {
    /// Public keys (string form) this provider can sign with.
    fn available_keys(&self) -> impl Future<Output = Result<Vec<String>, Error>> + Send;

    /// Sign each digest with each of the required keys, returning the
    /// signatures in key order per digest.
    fn sign(
        &self,
        digests: &[[u8; 32]],
        required_keys: &[String],
    ) -> impl Future<Output = Result<Vec<String>, Error>> + Send;
}
