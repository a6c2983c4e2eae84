use alloy_primitives::Address;
use moka::future::Cache as MokaCache;
use std::future::Future;
use std::time::Duration;

use crate::services::token_metadata::TokenMetadata;

/// Token metadata memo keyed by contract address
///
/// Entries are written once and never replaced while they live. The default
/// cache never evicts; [`TokenMetadataCache::with_ttl`] bounds entry lifetime
/// for deployments that want metadata to be re-resolved eventually.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct TokenMetadataCache {
    entries: MokaCache<Address, TokenMetadata>,
}

impl TokenMetadataCache {
    /// Unbounded cache, entries live for the lifetime of the process
    pub fn new() -> Self {
        Self {
            entries: MokaCache::builder().build(),
        }
    }

    /// Cache whose entries expire `ttl` after insertion
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: MokaCache::builder().time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self, address: &Address) -> Option<TokenMetadata> {
        self.entries.get(address).await
    }

    /// Return the cached entry or run `resolve` and store its result
    ///
    /// Concurrent callers for the same missing address share one `resolve`
    /// run: the first caller's future is driven, the rest wait for its value.
    pub async fn get_or_resolve<F>(&self, address: Address, resolve: F) -> TokenMetadata
    where
        F: Future<Output = TokenMetadata>,
    {
        self.entries.get_with(address, resolve).await
    }
}

impl Default for TokenMetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
