//! Response Envelope
//!
//! Every API response, success or failure, is wrapped as
//! `{ "success": bool, "data"?: ..., "message"?: string }`.
//! Listings additionally carry `pagination`.

use serde::Serialize;

use crate::pagination::{Paginated, Pagination};

/// 統一レスポンスエンベロープ
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// HTTP status used when rendered (not serialized)
    #[serde(skip)]
    status: u16,
}

impl<T> ApiResponse<T> {
    /// 200 with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
            status: 200,
        }
    }

    /// 201 with data
    pub fn created(data: T) -> Self {
        Self {
            status: 201,
            ..Self::ok(data)
        }
    }

    /// Failure envelope (status is decided by the caller)
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            pagination: None,
            status: 500,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

impl ApiResponse<()> {
    /// 200 with only a message, e.g. "Post deleted successfully"
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
            status: 200,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(page: Paginated<T>) -> Self {
        Self {
            pagination: Some(page.pagination),
            ..Self::ok(page.items)
        }
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
