// src/common/response.rs

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::query::{Paginated, Pagination};

/// Envelope único entre a UI e a camada de serviço.
/// A UI só olha `success`; nunca precisa tratar exceção.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, message: None, data: Some(data), pagination: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sucesso sem payload (ex.: exclusão).
    pub fn done(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), data: None, pagination: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None, pagination: None }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(page: Paginated<T>) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(page.rows),
            pagination: Some(page.pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PageWindow;

    #[test]
    fn failure_has_no_data() {
        let body = serde_json::to_value(ApiResponse::<()>::failure("Line not found")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "message": "Line not found" }));
    }

    #[test]
    fn page_carries_pagination() {
        let page = Paginated {
            rows: vec![1, 2, 3],
            pagination: PageWindow { page: 1, limit: 3 }.pagination(7),
        };
        let body = serde_json::to_value(ApiResponse::page(page)).unwrap();
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(body["pagination"]["totalPages"], 3);
    }
}
