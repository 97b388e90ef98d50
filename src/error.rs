//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response,
//! so every bid rejection and admin-action failure is distinguishable by
//! the client — never a generic "failed".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "bid too low: minimum acceptable amount is 11000",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category       | HTTP Status                |
/// |-----------|----------------|----------------------------|
/// | 1000–1999 | Validation     | 400 Bad Request            |
/// | 2000–2999 | Not Found      | 404 Not Found              |
/// | 3000–3999 | Server         | 500 Internal Server Error  |
/// | 4000–4999 | State Conflict | 409 Conflict               |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Auction with the given ID was not found.
    #[error("auction not found: {0}")]
    AuctionNotFound(uuid::Uuid),

    /// Notification with the given ID was not found in the inbox.
    #[error("notification not found: {0}")]
    NotificationNotFound(uuid::Uuid),

    /// Request validation failed before any state was touched.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown admin action string.
    #[error("invalid admin action: {0}")]
    InvalidAction(String),

    /// Bid amount below the current minimum. The minimum is recomputed
    /// against the post-commit leader, so the loser of a bid race sees
    /// the amount it actually has to beat.
    #[error("bid too low: minimum acceptable amount is {minimum}")]
    BidTooLow {
        /// Lowest amount the auction would currently accept.
        minimum: i64,
    },

    /// The auction is not accepting bids in its current lifecycle state.
    #[error("auction is not active (status: {status})")]
    AuctionNotActive {
        /// Current lifecycle status string.
        status: String,
    },

    /// The auction has not passed the admin-approval gate.
    #[error("auction is not approved for bidding")]
    NotApproved,

    /// The bidding window has not opened yet.
    #[error("auction has not started yet")]
    NotStarted,

    /// The bidding window has closed.
    #[error("auction bidding window has closed")]
    BiddingClosed,

    /// A merchant attempted to bid on their own auction.
    #[error("merchant cannot bid on their own auction")]
    SelfBid,

    /// Requested lifecycle transition is not allowed from the current state.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// State the auction is currently in.
        from: String,
        /// State the caller tried to move it to.
        to: String,
    },

    /// A buy-by-parts sale asked for more units than remain.
    #[error("insufficient remaining quantity: {remaining} left")]
    QuantityExhausted {
        /// Units still available.
        remaining: u32,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidAction(_) => 1002,
            Self::AuctionNotFound(_) => 2001,
            Self::NotificationNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::BidTooLow { .. } => 4001,
            Self::AuctionNotActive { .. } => 4002,
            Self::NotApproved => 4003,
            Self::NotStarted => 4004,
            Self::BiddingClosed => 4005,
            Self::SelfBid => 4006,
            Self::InvalidTransition { .. } => 4007,
            Self::QuantityExhausted { .. } => 4008,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAction(_) => StatusCode::BAD_REQUEST,
            Self::AuctionNotFound(_) | Self::NotificationNotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BidTooLow { .. }
            | Self::AuctionNotActive { .. }
            | Self::NotApproved
            | Self::NotStarted
            | Self::BiddingClosed
            | Self::SelfBid
            | Self::InvalidTransition { .. }
            | Self::QuantityExhausted { .. } => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bid_too_low_is_conflict() {
        let err = GatewayError::BidTooLow { minimum: 11_000 };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 4001);
        assert!(err.to_string().contains("11000"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = GatewayError::AuctionNotFound(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = GatewayError::InvalidRequest("amount must be positive".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn every_conflict_reason_is_distinguishable() {
        let reasons = [
            GatewayError::BidTooLow { minimum: 1 }.error_code(),
            GatewayError::AuctionNotActive {
                status: "ended".to_string(),
            }
            .error_code(),
            GatewayError::NotApproved.error_code(),
            GatewayError::NotStarted.error_code(),
            GatewayError::BiddingClosed.error_code(),
            GatewayError::SelfBid.error_code(),
            GatewayError::InvalidTransition {
                from: "ended".to_string(),
                to: "active".to_string(),
            }
            .error_code(),
        ];
        let mut unique = reasons.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), reasons.len());
    }
}
