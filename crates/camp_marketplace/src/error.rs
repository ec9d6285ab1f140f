use object_storage::StorageError;

/// Custom error type for marketplace operations
#[derive(thiserror::Error, Debug)]
pub enum MarketplaceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested row does not exist or is not visible to the caller
    #[error("{0} not found")]
    NotFound(String),

    /// Caller does not own the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The resource is not in a state that allows the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Image upload or removal failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation did not finish in time
    #[error("Operation timed out")]
    Timeout,
}

impl MarketplaceError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        MarketplaceError::Validation(message.into())
    }
}

impl actix_web::ResponseError for MarketplaceError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            MarketplaceError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            MarketplaceError::NotFound(what) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "message": format!("{} not found", what)
            })),
            MarketplaceError::Forbidden(msg) => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": msg
            })),
            MarketplaceError::Conflict(msg) => HttpResponse::Conflict().json(serde_json::json!({
                "error": "conflict",
                "message": msg
            })),
            MarketplaceError::Storage(_) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "storage_error",
                "message": "Failed to store images. Please try again."
            })),
            MarketplaceError::Timeout => HttpResponse::GatewayTimeout().json(serde_json::json!({
                "error": "timeout",
                "message": "Request took too long. Please try refreshing the page."
            })),
            MarketplaceError::Database(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{ResponseError, http::StatusCode};

    #[test]
    fn test_status_codes() {
        assert_eq!(
            MarketplaceError::validation("bad").error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketplaceError::NotFound("Camp".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            MarketplaceError::Conflict("done".into()).error_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MarketplaceError::Timeout.error_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
