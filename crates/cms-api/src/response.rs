//! API Response wrapper

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::error::ApiError;

/// Success envelope: `{success: true, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn created<T: Serialize>(data: T, message: &str) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success_with_message(data, message))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_omitted() {
        let json = serde_json::to_value(ApiResponse::message("Role deleted successfully")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Role deleted successfully");
        assert!(json.get("data").is_none());

        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert!(json.get("message").is_none());
        assert_eq!(json["data"][1], 2);
    }
}
