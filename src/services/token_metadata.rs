//! Token metadata resolution
//!
//! Resolves `{symbol, name, decimals}` for an ERC-20 contract by walking a
//! chain of sources, cheapest first, and stopping as soon as a symbol is
//! found:
//!
//! 1. `decimals()`, `symbol()`, `name()` called on-chain in parallel
//! 2. `symbol()` re-read as a `bytes32` (MKR-style tokens)
//! 3. Etherscan token info
//! 4. Etherscan verified source, unwrapping a declared proxy implementation
//! 5. A placeholder built from the address
//!
//! Every outcome, the placeholder included, is cached per address.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolType, sol_data};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::explorer::ExplorerApi;
use super::ledger::LedgerClient;
use crate::constants::DEFAULT_TOKEN_DECIMALS;
use crate::constants::abi::IERC20Metadata;
use crate::utils::address::{AddressError, abbreviate, checksummed, parse_address};
use crate::utils::cache::TokenMetadataCache;
use crate::utils::sanitize::sanitize_token_text;

/// Which source produced the symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    OnChain,
    Bytes32Symbol,
    ExplorerTokenInfo,
    ExplorerSource,
    ProxyImplementation,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenMetadata {
    /// Checksummed contract address
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    pub decimals: u8,
    pub symbol: String,
    pub name: Option<String>,
    pub source: MetadataSource,
}

impl TokenMetadata {
    /// True when no source knew the token
    pub fn is_placeholder(&self) -> bool {
        self.source == MetadataSource::Placeholder
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound for each on-chain metadata call
    pub call_timeout: Duration,
    /// Delay before the on-chain calls, to stay under provider rate limits
    pub pacing: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            pacing: Duration::from_millis(100),
        }
    }
}

/// Symbol and name as found so far
#[derive(Debug, Default)]
struct Labels {
    symbol: Option<String>,
    name: Option<String>,
}

impl Labels {
    /// A symbol of "Unknown..." counts as missing, so later tiers still run
    fn needs_symbol(&self) -> bool {
        self.symbol
            .as_deref()
            .is_none_or(|symbol| symbol.starts_with("Unknown"))
    }

    /// Adopt whatever `symbol`/`name` carry; returns whether the symbol was filled
    fn adopt(&mut self, symbol: Option<&str>, name: Option<&str>) -> bool {
        if let Some(name) = sanitize_token_text(name) {
            self.name = Some(name);
        }
        match sanitize_token_text(symbol) {
            Some(symbol) => {
                self.symbol = Some(symbol);
                !self.needs_symbol()
            }
            None => false,
        }
    }
}

pub struct TokenMetadataResolver {
    ledger: Arc<dyn LedgerClient>,
    explorer: Arc<dyn ExplorerApi>,
    cache: TokenMetadataCache,
    config: ResolverConfig,
}

impl TokenMetadataResolver {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        explorer: Arc<dyn ExplorerApi>,
        cache: TokenMetadataCache,
        config: ResolverConfig,
    ) -> Self {
        Self {
            ledger,
            explorer,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &TokenMetadataCache {
        &self.cache
    }

    /// Resolve metadata for a contract address given as text
    ///
    /// The only failure is an address that is not well-formed (or carries a
    /// wrong checksum). Everything else ends in a usable [`TokenMetadata`].
    pub async fn resolve(&self, contract_address: &str) -> Result<TokenMetadata, AddressError> {
        let address = parse_address(contract_address)?;
        Ok(self.resolve_address(address).await)
    }

    /// Resolve metadata for a parsed address, consulting the cache first
    ///
    /// Concurrent first-time lookups of the same address share one resolution.
    pub async fn resolve_address(&self, address: Address) -> TokenMetadata {
        self.cache
            .get_or_resolve(address, self.resolve_uncached(address))
            .await
    }

    /// Run the whole fallback chain, bypassing the cache
    pub async fn resolve_uncached(&self, address: Address) -> TokenMetadata {
        let contract_address = checksummed(&address);
        log::debug!("Resolving token metadata for {}", contract_address);

        tokio::time::sleep(self.config.pacing).await;

        let (decimals, symbol_raw, name_raw) = futures::join!(
            self.metadata_call(address, IERC20Metadata::decimalsCall::SELECTOR),
            self.metadata_call(address, IERC20Metadata::symbolCall::SELECTOR),
            self.metadata_call(address, IERC20Metadata::nameCall::SELECTOR),
        );

        let decimals = decimals
            .as_ref()
            .and_then(|output| decode_decimals(output))
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);

        let mut labels = Labels {
            symbol: None,
            name: name_raw
                .as_ref()
                .and_then(|output| decode_string(output))
                .and_then(|name| sanitize_token_text(Some(&name))),
        };

        let on_chain_symbol = symbol_raw
            .as_ref()
            .and_then(|output| decode_string(output));
        let source = if labels.adopt(on_chain_symbol.as_deref(), None) {
            Some(MetadataSource::OnChain)
        } else {
            self.bytes32_symbol(address, symbol_raw)
                .await
                .filter(|symbol| labels.adopt(Some(symbol.as_str()), None))
                .map(|_| MetadataSource::Bytes32Symbol)
        };

        let source = match source {
            Some(source) => source,
            None => self
                .explorer_labels(address, &mut labels)
                .await
                .unwrap_or(MetadataSource::Placeholder),
        };

        let symbol = match (source, labels.symbol) {
            (MetadataSource::Placeholder, _) | (_, None) => {
                log::warn!(
                    "No metadata source knew token {}, using placeholder",
                    contract_address
                );
                format!("Unknown ({})", abbreviate(&address))
            }
            (_, Some(symbol)) => symbol,
        };

        TokenMetadata {
            contract_address,
            decimals,
            symbol,
            name: labels.name,
            source,
        }
    }

    /// One zero-argument `eth_call`, bounded by the configured timeout
    async fn metadata_call(&self, address: Address, selector: [u8; 4]) -> Option<Bytes> {
        let data = Bytes::copy_from_slice(&selector);
        match tokio::time::timeout(self.config.call_timeout, self.ledger.call(address, data)).await
        {
            Ok(Ok(output)) => Some(output),
            Ok(Err(e)) => {
                log::debug!(
                    "0x{} on {} failed: {}",
                    hex::encode(selector),
                    address,
                    e
                );
                None
            }
            Err(_) => {
                log::debug!("0x{} on {} timed out", hex::encode(selector), address);
                None
            }
        }
    }

    /// `symbol()` read as `bytes32`
    ///
    /// Reuses the output of the first `symbol()` call when there was one and
    /// issues a fresh raw call otherwise.
    async fn bytes32_symbol(&self, address: Address, previous: Option<Bytes>) -> Option<String> {
        let raw = match previous {
            Some(raw) => raw,
            None => {
                self.metadata_call(address, IERC20Metadata::symbolCall::SELECTOR)
                    .await?
            }
        };
        decode_bytes32_text(&raw)
    }

    /// Explorer tiers; returns the source that produced the symbol, if any
    async fn explorer_labels(
        &self,
        address: Address,
        labels: &mut Labels,
    ) -> Option<MetadataSource> {
        if !self.explorer.is_configured() {
            log::debug!("Explorer not configured, skipping lookups for {}", address);
            return None;
        }

        let implementation = match self.explorer_lookup(address, labels).await {
            ExplorerLookup::Found(source) => return Some(source),
            ExplorerLookup::Proxy(implementation) => implementation,
            ExplorerLookup::Missing => return None,
        };

        // One level of proxy unwrapping
        log::debug!(
            "{} is a proxy, trying implementation {}",
            address,
            implementation
        );
        match self.explorer_lookup(implementation, labels).await {
            ExplorerLookup::Found(_) => Some(MetadataSource::ProxyImplementation),
            ExplorerLookup::Proxy(_) | ExplorerLookup::Missing => None,
        }
    }

    /// Token info, then verified source, for one address
    async fn explorer_lookup(&self, address: Address, labels: &mut Labels) -> ExplorerLookup {
        if let Some(info) = self.explorer.token_info(&address).await {
            if labels.adopt(info.symbol.as_deref(), info.token_name.as_deref()) {
                return ExplorerLookup::Found(MetadataSource::ExplorerTokenInfo);
            }
        }

        let source = match self.explorer.contract_source(&address).await {
            Some(source) => source,
            None => return ExplorerLookup::Missing,
        };
        let name = sanitize_token_text(source.token_name.as_deref())
            .or_else(|| sanitize_token_text(source.contract_name.as_deref()));
        if labels.adopt(source.symbol.as_deref(), name.as_deref()) {
            return ExplorerLookup::Found(MetadataSource::ExplorerSource);
        }

        match source.implementation_address() {
            Some(implementation) => ExplorerLookup::Proxy(implementation),
            None => ExplorerLookup::Missing,
        }
    }
}

enum ExplorerLookup {
    Found(MetadataSource),
    /// No symbol, but the contract declares a proxy implementation
    Proxy(Address),
    Missing,
}

/// ABI `uint` return; values that do not fit a `u8` count as a failed call
fn decode_decimals(output: &[u8]) -> Option<u8> {
    let value: U256 = <sol_data::Uint<256> as SolType>::abi_decode(output).ok()?;
    u8::try_from(value).ok()
}

fn decode_string(output: &[u8]) -> Option<String> {
    <sol_data::String as SolType>::abi_decode(output).ok()
}

/// `bytes32` text, null-terminated
///
/// A well-formed word is cut at the first NUL; anything else falls back to
/// the first 32 raw bytes read as lossy UTF-8 with trailing NULs removed.
fn decode_bytes32_text(output: &[u8]) -> Option<String> {
    let text = match <sol_data::FixedBytes<32> as SolType>::abi_decode(output) {
        Ok(word) => {
            let end = word.iter().position(|b| *b == 0).unwrap_or(word.len());
            String::from_utf8(word[..end].to_vec()).ok()?
        }
        Err(_) => {
            let head = &output[..output.len().min(32)];
            String::from_utf8_lossy(head)
                .trim_end_matches('\0')
                .to_string()
        }
    };
    sanitize_token_text(Some(&text))
}
