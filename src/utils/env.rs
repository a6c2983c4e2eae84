use std::time::Duration;

/// Value shipped in `.env.example`; treated the same as an unset key
const PLACEHOLDER_API_KEY: &str = "YourApiKeyToken";

#[derive(Clone, Debug)]
pub struct EnvVars {
    pub ethereum_network: String,
    pub ethereum_rpc_url: String,
    pub chain_id: u64,
    pub etherscan_api_key: Option<String>,
    pub etherscan_api_base_url: String, // Override for testing
    pub port: u16,
    // Outbound timeouts
    pub rpc_timeout_seconds: u64,
    pub explorer_timeout_seconds: u64,
    pub tx_list_timeout_seconds: u64,
    // Advisory pacing in front of third-party APIs
    pub metadata_pacing_ms: u64,
    pub explorer_pacing_ms: u64,
    // None keeps token metadata for the lifetime of the process
    pub token_metadata_ttl_seconds: Option<u64>,
    // CORS configuration
    pub cors_allowed_origins: Vec<String>,
}

impl EnvVars {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    pub fn explorer_timeout(&self) -> Duration {
        Duration::from_secs(self.explorer_timeout_seconds)
    }

    pub fn tx_list_timeout(&self) -> Duration {
        Duration::from_secs(self.tx_list_timeout_seconds)
    }

    pub fn metadata_pacing(&self) -> Duration {
        Duration::from_millis(self.metadata_pacing_ms)
    }

    pub fn explorer_pacing(&self) -> Duration {
        Duration::from_millis(self.explorer_pacing_ms)
    }

    pub fn token_metadata_ttl(&self) -> Option<Duration> {
        self.token_metadata_ttl_seconds.map(Duration::from_secs)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for EnvVars {
    fn default() -> Self {
        let ethereum_network =
            std::env::var("ETHEREUM_NETWORK").unwrap_or_else(|_| "mainnet".to_string());

        // Explicit RPC URL wins; otherwise build the Infura endpoint for the network
        let ethereum_rpc_url = std::env::var("ETHEREUM_RPC_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                let project_id = std::env::var("INFURA_PROJECT_ID")
                    .expect("ETHEREUM_RPC_URL or INFURA_PROJECT_ID must be set");
                format!("https://{}.infura.io/v3/{}", ethereum_network, project_id)
            });

        Self {
            ethereum_rpc_url,
            ethereum_network,
            chain_id: parse_or("CHAIN_ID", 1),
            etherscan_api_key: std::env::var("ETHERSCAN_API_KEY")
                .ok()
                .filter(|s| !s.is_empty() && s != PLACEHOLDER_API_KEY),
            etherscan_api_base_url: std::env::var("ETHERSCAN_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.etherscan.io/v2/api".to_string()),
            port: parse_or("PORT", 3000),
            rpc_timeout_seconds: parse_or("RPC_TIMEOUT_SECONDS", 10),
            explorer_timeout_seconds: parse_or("EXPLORER_TIMEOUT_SECONDS", 8),
            tx_list_timeout_seconds: parse_or("TX_LIST_TIMEOUT_SECONDS", 30),
            metadata_pacing_ms: parse_or("METADATA_PACING_MS", 100),
            explorer_pacing_ms: parse_or("EXPLORER_PACING_MS", 200),
            token_metadata_ttl_seconds: std::env::var("TOKEN_METADATA_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok()),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3001,http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}
