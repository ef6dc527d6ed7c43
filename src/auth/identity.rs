//! Authenticated subject extractor
//!
//! Handlers that need a caller take an `AuthenticatedUser` argument. The
//! extractor reads the bearer token from the `Authorization` header, or from
//! the `accessToken` cookie when no header is sent, validates it and loads
//! the matching user record. Any failure rejects the request with `401`.

use crate::user::error::UserError;
use crate::user::models::User;
use crate::user::service::UserService;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

/// Name of the cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// The user record resolved from the request's access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

/// Bearer token from the header, else from the cookie
fn extract_token(req: &HttpRequest) -> Result<String, UserError> {
    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let value = header
            .to_str()
            .map_err(|_| UserError::Unauthorized("Invalid authorization header".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                UserError::Unauthorized("Invalid authorization header format".to_string())
            });
    }

    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| UserError::Unauthorized("Unauthorized request".to_string()))
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_token(req);
        let service = req.app_data::<web::Data<UserService>>().cloned();

        Box::pin(async move {
            let token = token?;
            let service = service
                .ok_or_else(|| UserError::internal("UserService is not registered as app data"))?;
            let user = service.authenticate(&token).await?;
            Ok::<_, actix_web::Error>(AuthenticatedUser(user))
        })
    }
}
