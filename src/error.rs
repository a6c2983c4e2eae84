use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::block_locator::LocatorError;
use crate::services::explorer::ExplorerError;
use crate::services::ledger::LedgerError;
use crate::utils::address::AddressError;
use crate::utils::format::iso_date_from_unix;

#[derive(Debug)]
pub enum ApiError {
    InvalidAddress(String),
    InvalidTransactionHash(String),
    InvalidDate(String),
    FutureDate { target: u64, latest: u64 },
    Ledger(LedgerError),
    Explorer(ExplorerError),
    Config(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidAddress(input) => write!(f, "Invalid address format: {}", input),
            ApiError::InvalidTransactionHash(input) => {
                write!(f, "Invalid transaction hash format: {}", input)
            }
            ApiError::InvalidDate(input) => {
                write!(f, "Invalid date format: {}. Use YYYY-MM-DD", input)
            }
            ApiError::FutureDate { target, latest } => write!(
                f,
                "Date is in the future. Target timestamp {} is after the latest block timestamp {} ({})",
                target,
                latest,
                iso_date_from_unix(*latest).unwrap_or_default()
            ),
            ApiError::Ledger(e) => write!(f, "Blockchain query failed: {}", e),
            ApiError::Explorer(e) => write!(f, "{}", e),
            ApiError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AddressError> for ApiError {
    fn from(e: AddressError) -> Self {
        ApiError::InvalidAddress(e.0)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        ApiError::Ledger(e)
    }
}

impl From<ExplorerError> for ApiError {
    fn from(e: ExplorerError) -> Self {
        match e {
            ExplorerError::MissingApiKey => ApiError::Config(
                "Etherscan API key not configured. Please set ETHERSCAN_API_KEY in your .env file."
                    .to_string(),
            ),
            other => ApiError::Explorer(other),
        }
    }
}

impl From<LocatorError> for ApiError {
    fn from(e: LocatorError) -> Self {
        match e {
            LocatorError::FutureDate { target, latest } => ApiError::FutureDate { target, latest },
            LocatorError::Ledger(e) => ApiError::Ledger(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAddress(_)
            | ApiError::InvalidTransactionHash(_)
            | ApiError::InvalidDate(_)
            | ApiError::FutureDate { .. } => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::BlockNotFound(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Ledger(_) => StatusCode::BAD_GATEWAY,
            ApiError::Explorer(e) => match e {
                ExplorerError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ExplorerError::Http(status) => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                ExplorerError::Api(_) => StatusCode::BAD_REQUEST,
                ExplorerError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
                ExplorerError::Transport(_) | ExplorerError::Malformed(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidAddress("0x12".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ExplorerError::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(ExplorerError::Http(429)).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(ExplorerError::Api("NOTOK".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert!(matches!(
            ApiError::from(ExplorerError::MissingApiKey),
            ApiError::Config(_)
        ));
        assert_eq!(
            ApiError::from(LedgerError::Timeout(std::time::Duration::from_secs(10))).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_future_date_message_names_latest_block_time() {
        let err = ApiError::from(LocatorError::FutureDate {
            target: 1_800_000_000,
            latest: 1_704_067_200,
        });
        assert_eq!(
            err.to_string(),
            "Date is in the future. Target timestamp 1800000000 is after the latest block timestamp 1704067200 (2024-01-01T00:00:00.000Z)"
        );
    }
}
