//! User Service Module
//!
//! Business rules for the account operations. Handlers hand over raw request
//! data and the authenticated subject; the service validates, talks to the
//! repository and the media gateway, and returns domain values or a
//! `UserError`.

use crate::auth::jwt::{IssuedToken, JwtService};
use crate::media::{MediaGateway, StagedFile};
use crate::user::dto::{RegisterRequest, UpdateDetailsRequest};
use crate::user::error::{UserError, UserResult};
use crate::user::models::{Gender, NewUser, User};
use crate::user::repository::UserRepository;
use crate::utils::validation::{is_valid_email, normalize_email, required};
use std::sync::Arc;

const MISSING_FIELDS: &str = "Please fill the required fields";
const MALFORMED_EMAIL: &str = "Please enter proper email.";

/// Service for managing user-related operations
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    media: Arc<dyn MediaGateway>,
}

impl UserService {
    /// Creates a new UserService with the given dependencies
    pub fn new(
        repo: Arc<dyn UserRepository>,
        jwt: Arc<JwtService>,
        media: Arc<dyn MediaGateway>,
    ) -> Self {
        Self {
            repo,
            jwt,
            media,
        }
    }

    /// Store reachability, for health checks
    pub async fn ping_store(&self) -> UserResult<()> {
        self.repo.ping().await
    }

    /// Registers a new user
    ///
    /// The email lookup only provides a friendly early answer; the store's
    /// unique constraint decides when two registrations race.
    pub async fn register(&self, request: &RegisterRequest) -> UserResult<User> {
        let (Some(first_name), Some(last_name), Some(email), Some(gender)) = (
            required(request.first_name.as_deref()),
            required(request.last_name.as_deref()),
            required(request.email.as_deref()),
            required(request.gender.as_deref()),
        ) else {
            return Err(UserError::validation(MISSING_FIELDS));
        };

        if !is_valid_email(email) {
            return Err(UserError::validation(MALFORMED_EMAIL));
        }

        let gender: Gender = gender.parse().map_err(|_| {
            UserError::validation("Gender must be one of: male, female, other.")
        })?;
        let email = normalize_email(email);

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(UserError::Conflict("User email already exists.".to_string()));
        }

        let id = self
            .repo
            .create(NewUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email,
                gender,
            })
            .await?;

        let user = self.repo.find_by_id(id).await?.ok_or_else(|| {
            UserError::internal(format!("User {id} missing right after insert"))
        })?;

        log::info!("User {} registered", user.id);
        Ok(user)
    }

    /// Issues an access token for a registered email.
    ///
    /// No credential is checked: knowing a registered email is enough to
    /// obtain a token for it.
    pub async fn issue_token(&self, email: Option<&str>) -> UserResult<IssuedToken> {
        let email = required(email)
            .map(normalize_email)
            .ok_or_else(|| UserError::Unauthorized("Invalid user".to_string()))?;

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| UserError::Unauthorized("User not authorized!".to_string()))?;

        let issued = self.jwt.issue(&user.email)?;
        log::info!("Access token issued for user {}", user.id);
        Ok(issued)
    }

    /// Resolves the subject of a validated access token
    pub async fn authenticate(&self, token: &str) -> UserResult<User> {
        let claims = self.jwt.validate(token)?;
        self.repo
            .find_by_email(&claims.email)
            .await?
            .ok_or_else(|| UserError::Unauthorized("User not authorized!".to_string()))
    }

    /// Replaces first and last name of the subject
    pub async fn update_details(
        &self,
        subject: &User,
        request: &UpdateDetailsRequest,
    ) -> UserResult<User> {
        let (Some(first_name), Some(last_name)) = (
            required(request.first_name.as_deref()),
            required(request.last_name.as_deref()),
        ) else {
            return Err(UserError::validation(MISSING_FIELDS));
        };

        let user = self
            .repo
            .update_details(subject.id, first_name, last_name)
            .await?
            .ok_or(UserError::UserNotFound)?;

        log::info!("User {} updated account details", user.id);
        Ok(user)
    }

    /// Moves the subject to a new email address
    pub async fn update_email(&self, subject: &User, email: Option<&str>) -> UserResult<User> {
        let email =
            required(email).ok_or_else(|| UserError::validation("Please enter the email."))?;

        if !is_valid_email(email) {
            return Err(UserError::validation(MALFORMED_EMAIL));
        }

        let email = normalize_email(email);
        if email == subject.email {
            return Err(UserError::validation("This is your previous email."));
        }

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(UserError::Conflict("This email already has an account.".to_string()));
        }

        let user = self
            .repo
            .update_email(subject.id, &email)
            .await
            .map_err(|e| match e {
                UserError::Conflict(_) => {
                    UserError::Conflict("This email already has an account.".to_string())
                },
                other => other,
            })?
            .ok_or(UserError::UserNotFound)?;

        log::info!("User {} changed email", user.id);
        Ok(user)
    }

    /// Uploads a staged avatar and records its URL on the subject
    pub async fn update_avatar(
        &self,
        subject: &User,
        file: Option<StagedFile>,
    ) -> UserResult<User> {
        let file = file.ok_or_else(|| UserError::validation("Avatar file is missing"))?;

        let media = self
            .media
            .upload(file)
            .await
            .ok_or_else(|| UserError::Upload("Error while uploading avatar".to_string()))?;

        let user = self
            .repo
            .update_avatar(subject.id, &media.url)
            .await?
            .ok_or(UserError::UserNotFound)?;

        log::info!("User {} changed avatar", user.id);
        Ok(user)
    }
}
