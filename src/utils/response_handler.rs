//! HTTP Response Envelope
//!
//! Every endpoint answers with the same JSON shape:
//! - success: `{ statusCode, data, message, success: true }`
//! - failure: `{ statusCode, error, message, success: false }`
//!
//! `ApiResponse` builds the success side and implements `Responder`;
//! `ErrorEnvelope` is rendered by `UserError`'s `ResponseError` impl.

use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// Success envelope
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.is_success(),
        }
    }

    /// 200 envelope
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// 201 envelope
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK)
    }

    /// Render the envelope and attach a cookie to the response
    pub fn with_cookie(self, cookie: Cookie<'static>) -> HttpResponse {
        HttpResponse::build(self.status()).cookie(cookie).json(self)
    }
}

impl<T: Serialize> Responder for ApiResponse<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status()).json(self)
    }
}

/// Failure envelope
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    pub success: bool,
}

impl ErrorEnvelope {
    pub fn new(status_code: u16, error: &str, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error: error.to_string(),
            message: message.into(),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn test_created_envelope() {
        let req = test::TestRequest::default().to_http_request();
        let response = ApiResponse::created(json!({"id": 1}), "Created").respond_to(&req);

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"statusCode": 201, "data": {"id": 1}, "message": "Created", "success": true}));
    }

    #[actix_web::test]
    async fn test_cookie_is_attached() {
        let cookie = Cookie::build("accessToken", "abc").http_only(true).finish();
        let response = ApiResponse::ok(json!({}), "ok").with_cookie(cookie);

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.cookies().find(|c| c.name() == "accessToken").unwrap();
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
    }
}
