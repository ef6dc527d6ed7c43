//! User API handlers
//!
//! HTTP handler functions for the account endpoints. They unpack the
//! request, delegate to `UserService` and wrap the outcome in the response
//! envelope; errors render themselves through `UserError`.

use crate::auth::identity::{AuthenticatedUser, ACCESS_TOKEN_COOKIE};
use crate::media::stage_file;
use crate::types::UploadConfig;
use crate::user::dto::{
    RegisterRequest, TokenRequest, TokenResponse, UpdateDetailsRequest, UpdateEmailRequest,
};
use crate::user::error::UserError;
use crate::user::models::User;
use crate::user::service::UserService;
use crate::utils::response_handler::ApiResponse;
use actix_multipart::Multipart;
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};

/// Multipart field carrying the avatar image
pub const AVATAR_FIELD: &str = "avatar";

/// POST /register
pub async fn register_user(
    service: web::Data<UserService>,
    body: web::Json<RegisterRequest>,
) -> Result<ApiResponse<User>, UserError> {
    let user = service.register(&body).await?;
    Ok(ApiResponse::created(user, "User registered successfully"))
}

/// POST /jwt
///
/// The token is returned in the payload and set as an HTTP-only, secure
/// cookie.
pub async fn send_access_token(
    service: web::Data<UserService>,
    body: web::Json<TokenRequest>,
) -> Result<HttpResponse, UserError> {
    let issued = service.issue_token(body.email.as_deref()).await?;

    let max_age = i64::try_from(issued.expires_in.as_secs()).unwrap_or(i64::MAX);
    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, issued.token.clone())
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .finish();

    let envelope = ApiResponse::ok(
        TokenResponse {
            token: issued.token,
        },
        "JWT token sent successfully",
    );
    Ok(envelope.with_cookie(cookie))
}

/// GET /user-details
pub async fn get_current_user(subject: AuthenticatedUser) -> ApiResponse<User> {
    ApiResponse::ok(subject.into_inner(), "Current user fetched successfully")
}

/// PUT /user-details
pub async fn update_user_details(
    service: web::Data<UserService>,
    subject: AuthenticatedUser,
    body: web::Json<UpdateDetailsRequest>,
) -> Result<ApiResponse<User>, UserError> {
    let user = service.update_details(&subject, &body).await?;
    Ok(ApiResponse::ok(user, "Account details updated successfully."))
}

/// PUT /update-email
pub async fn update_email(
    service: web::Data<UserService>,
    subject: AuthenticatedUser,
    body: web::Json<UpdateEmailRequest>,
) -> Result<ApiResponse<User>, UserError> {
    let user = service.update_email(&subject, body.email.as_deref()).await?;
    Ok(ApiResponse::ok(user, "Email updated successfully."))
}

/// PUT /avatar
pub async fn update_avatar(
    req: HttpRequest,
    service: web::Data<UserService>,
    upload: web::Data<UploadConfig>,
    subject: AuthenticatedUser,
    payload: Multipart,
) -> Result<ApiResponse<User>, UserError> {
    // Media types are case-insensitive; the parsed form is lowercased.
    let is_multipart = req.mime_type().ok().flatten().is_some_and(|mime| {
        mime.type_().as_str() == "multipart" && mime.subtype().as_str() == "form-data"
    });

    let file = if is_multipart {
        stage_file(payload, AVATAR_FIELD, &upload).await?
    } else {
        None
    };

    let user = service.update_avatar(&subject, file).await?;
    Ok(ApiResponse::ok(user, "Avatar updated successfully."))
}

/// Renders malformed JSON bodies as validation envelopes
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    UserError::validation(format!("Invalid request body: {err}")).into()
}
