use std::sync::Arc;

use crate::services::{
    EtherscanClient, ExplorerApi, JsonRpcLedgerClient, LedgerClient, ResolverConfig,
    TokenMetadataResolver,
};
use crate::utils::{cache::TokenMetadataCache, env::EnvVars};

pub struct AppState {
    pub ledger: Arc<dyn LedgerClient>,
    pub explorer: Arc<dyn ExplorerApi>,
    pub token_metadata: TokenMetadataResolver,
    pub env_vars: EnvVars,
}

impl AppState {
    /// Build the production clients from environment configuration
    pub async fn new() -> Result<AppState, Box<dyn std::error::Error>> {
        let env_vars = EnvVars::default();
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ethx-be/", env!("CARGO_PKG_VERSION")))
            .build()?;

        log::info!(
            "Using Ethereum {} via JSON-RPC (timeout {:?})",
            env_vars.ethereum_network,
            env_vars.rpc_timeout()
        );
        let ledger: Arc<dyn LedgerClient> = Arc::new(JsonRpcLedgerClient::new(
            http_client.clone(),
            env_vars.ethereum_rpc_url.clone(),
            env_vars.rpc_timeout(),
        ));

        if env_vars.etherscan_api_key.is_some() {
            log::info!(
                "Etherscan API key found, using {} (chain {})",
                env_vars.etherscan_api_base_url,
                env_vars.chain_id
            );
        } else {
            log::warn!(
                "No Etherscan API key found, transaction endpoints and explorer metadata fallbacks are disabled"
            );
        }
        let explorer: Arc<dyn ExplorerApi> = Arc::new(
            EtherscanClient::with_base_url(
                http_client,
                env_vars.etherscan_api_key.clone(),
                env_vars.chain_id,
                env_vars.etherscan_api_base_url.clone(),
            )
            .with_timeouts(env_vars.explorer_timeout(), env_vars.tx_list_timeout()),
        );

        Ok(Self::from_parts(env_vars, ledger, explorer))
    }

    /// Assemble state around already-built clients
    pub fn from_parts(
        env_vars: EnvVars,
        ledger: Arc<dyn LedgerClient>,
        explorer: Arc<dyn ExplorerApi>,
    ) -> AppState {
        let cache = match env_vars.token_metadata_ttl() {
            Some(ttl) => {
                log::info!("Token metadata expires {:?} after resolution", ttl);
                TokenMetadataCache::with_ttl(ttl)
            }
            None => TokenMetadataCache::new(),
        };

        let token_metadata = TokenMetadataResolver::new(
            ledger.clone(),
            explorer.clone(),
            cache,
            ResolverConfig {
                call_timeout: env_vars.rpc_timeout(),
                pacing: env_vars.metadata_pacing(),
            },
        );

        AppState {
            ledger,
            explorer,
            token_metadata,
            env_vars,
        }
    }
}
