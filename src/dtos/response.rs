use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::utils::pagination::{Page, PageMeta};

/// 统一响应信封：`{ success, message?, data?, pagination? }`
///
/// 后台所有列表接口的数据都放在 `data` 中，分页信息放在 `pagination` 中。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn with_data(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn with_code(code: StatusCode, msg: &str, data: Option<T>) -> Self {
        Self {
            status: code,
            success: code.is_success(),
            message: Some(msg.to_string()),
            data,
            pagination: None,
        }
    }

    /// 非 `Vec` 载荷（如带状态计数的评论列表）附加分页信息
    pub fn with_pagination(mut self, meta: PageMeta) -> Self {
        self.pagination = Some(meta);
        self
    }
}

impl<T> ApiResponse<Vec<T>>
where
    T: Serialize,
{
    pub fn with_page(page: Page<T>) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: None,
            data: Some(page.items),
            pagination: Some(page.meta),
        }
    }
}

impl ApiResponse<()> {
    pub fn with_message(msg: &str) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: Some(msg.to_string()),
            data: None,
            pagination: None,
        }
    }

    pub fn with_error(code: StatusCode, msg: &str) -> Self {
        Self {
            status: code,
            success: false,
            message: Some(msg.to_string()),
            data: None,
            pagination: None,
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pagination::paginate;

    #[test]
    fn paged_envelope_shape() {
        let page = paginate(vec!["a", "b", "c"], 1, 2);
        let body = serde_json::to_value(ApiResponse::with_page(page)).unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!(["a", "b"]));
        assert_eq!(body["pagination"]["total_pages"], 2);
        assert!(body.get("message").is_none());
    }

    #[test]
    fn error_envelope_has_no_data() {
        let body = serde_json::to_value(ApiResponse::<()>::with_error(StatusCode::UNAUTHORIZED, "Missing token")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "message": "Missing token" }));
    }
}
