use axum::extract::{Path, State};
use std::sync::Arc;

use crate::AppState;
use crate::handlers::{ApiResponse, ApiResult};
use crate::services::token_metadata::TokenMetadata;

/// Symbol, name and decimals of an ERC-20 contract
///
/// Always succeeds for a well-formed address; tokens nobody knows come back
/// with a placeholder symbol and `source: "placeholder"`.
pub async fn get_token_metadata(
    State(state): State<Arc<AppState>>,
    Path(contract_address): Path<String>,
) -> ApiResult<TokenMetadata> {
    let metadata = state.token_metadata.resolve(&contract_address).await?;
    Ok(ApiResponse::ok(metadata))
}
