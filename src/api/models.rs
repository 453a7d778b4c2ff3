use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::BalancerError;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateBalanceRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    /// Minor currency units
    pub amount: i64,
    pub consumers: Vec<String>,
    pub description: String,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for BalancerError to implement IntoResponse
pub struct ApiError(pub BalancerError);

impl From<BalancerError> for ApiError {
    fn from(err: BalancerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BalancerError::InvalidInput(..) | BalancerError::InvalidMember(_) => {
                StatusCode::BAD_REQUEST
            }
            BalancerError::Forbidden(_) => StatusCode::FORBIDDEN,
            BalancerError::BalanceNotFound(_)
            | BalancerError::UserNotFound(_)
            | BalancerError::PurchaseNotFound(_) => StatusCode::NOT_FOUND,
            BalancerError::Conflict(_) => StatusCode::CONFLICT,
            BalancerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BalancerError::Internal(_) | BalancerError::Logging(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
