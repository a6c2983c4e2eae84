use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{AppState, handlers};

async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "network": state.env_vars.ethereum_network,
        "chainId": state.env_vars.chain_id,
        "explorer": {
            "configured": state.explorer.is_configured()
        }
    }))
}

pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))
        .route(
            "/api/blockchain/info",
            get(handlers::blockchain::get_blockchain_info),
        )
        // Transaction endpoints
        .route(
            "/api/transactions/live/{wallet_address}",
            get(handlers::transactions::live::get_live_transactions),
        )
        .route(
            "/api/transactions/stats/{wallet_address}",
            get(handlers::transactions::stats::get_transaction_stats),
        )
        .route(
            "/api/transactions/count/{wallet_address}",
            get(handlers::transactions::stats::get_transaction_count),
        )
        .route(
            "/api/transactions/receipt/{tx_hash}",
            get(handlers::transactions::receipt::get_receipt_transfers),
        )
        // Balance endpoints
        .route(
            "/api/balance/{wallet_address}",
            get(handlers::balance::get_current_balance),
        )
        .route(
            "/api/balance/{wallet_address}/{date}",
            get(handlers::balance::get_balance_at_date),
        )
        // Token endpoints
        .route(
            "/api/token-meta/{contract_address}",
            get(handlers::token::get_token_metadata),
        )
        .with_state(state)
}
