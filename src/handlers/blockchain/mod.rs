use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::handlers::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainInfo {
    pub current_block: u64,
    pub network: String,
}

pub async fn get_blockchain_info(State(state): State<Arc<AppState>>) -> ApiResult<BlockchainInfo> {
    let current_block = state.ledger.block_number().await?;

    Ok(ApiResponse::ok(BlockchainInfo {
        current_block,
        network: state.env_vars.ethereum_network.clone(),
    }))
}
