//! User account routes
//!
//! Configuration of the account HTTP endpoints. Routes taking an
//! `AuthenticatedUser` reject requests without a valid access token.

use crate::user::handlers;
use actix_web::web;

/// Configure user account routes
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(handlers::register_user))
        .route("/jwt", web::post().to(handlers::send_access_token))
        .route("/user-details", web::get().to(handlers::get_current_user))
        .route("/user-details", web::put().to(handlers::update_user_details))
        .route("/update-email", web::put().to(handlers::update_email))
        .route("/avatar", web::put().to(handlers::update_avatar));
}
