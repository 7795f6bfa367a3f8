//! ABI provider: per-account ABI lookup with a process-lifetime cache

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::abi::Abi;
use crate::error::Error;
use crate::rpc::RpcProvider;

/// Resolves contract ABIs by account name.
pub trait AbiProvider: Send + Sync {
    fn get_abi(&self, account: &str) -> impl Future<Output = Result<Arc<Abi>, Error>> + Send;
}

/// [`AbiProvider`] that fetches raw ABIs through the RPC provider and caches
/// them for the life of the process.
///
/// Entries never expire on their own; a caller who knows a contract was
/// redeployed must call [`invalidate`](Self::invalidate). Readers always see
/// either the previously cached ABI or the fully decoded new one.
pub struct CachedAbiProvider<R: RpcProvider> {
    rpc: Arc<R>,
    cache: RwLock<HashMap<String, Arc<Abi>>>,
}

impl<R: RpcProvider> CachedAbiProvider<R> {
    pub fn new(rpc: Arc<R>) -> Self {
        Self {
            rpc,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop the cached ABI for one account, forcing a refetch on next use.
    pub fn invalidate(&self, account: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(account);
        }
    }

    /// Drop every cached ABI.
    pub fn invalidate_all(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    fn cached(&self, account: &str) -> Option<Arc<Abi>> {
        self.cache.read().ok()?.get(account).cloned()
    }

    async fn fetch(&self, account: &str) -> Result<Arc<Abi>, Error> {
        let raw = self.rpc.get_raw_abi(account).await.map_err(|e| Error::AbiFetch {
            account: account.to_string(),
            message: "raw ABI fetch failed".to_string(),
            source: Some(Box::new(e)),
        })?;
        if raw.abi.is_empty() {
            return Err(Error::AbiFetch {
                account: account.to_string(),
                message: "account has no ABI".to_string(),
                source: None,
            });
        }
        let bytes = BASE64.decode(raw.abi.as_bytes()).map_err(|e| Error::AbiFetch {
            account: account.to_string(),
            message: format!("raw ABI is not valid base64: {}", e),
            source: None,
        })?;
        let abi = Abi::from_bytes(&bytes).map_err(|e| Error::AbiFetch {
            account: account.to_string(),
            message: "raw ABI could not be decoded".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(Arc::new(abi))
    }
}

impl<R: RpcProvider> AbiProvider for CachedAbiProvider<R> {
    async fn get_abi(&self, account: &str) -> Result<Arc<Abi>, Error> {
        if account.is_empty() {
            return Err(Error::AbiFetch {
                account: String::new(),
                message: "account name is empty".to_string(),
                source: None,
            });
        }
        if let Some(abi) = self.cached(account) {
            return Ok(abi);
        }

        debug!(account, "ABI cache miss, fetching");
        let abi = self.fetch(account).await?;
        if let Ok(mut cache) = self.cache.write() {
            // Concurrent misses may race; keeping the last insert is fine
            // since both decoded the same account's ABI.
            cache.insert(account.to_string(), abi.clone());
        }
        Ok(abi)
    }
}
