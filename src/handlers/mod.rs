pub mod balance;
pub mod blockchain;
pub mod token;
pub mod transactions;

use axum::Json;
use serde::Serialize;

use crate::error::ApiError;

/// `{ "success": true, "data": ... }` envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
