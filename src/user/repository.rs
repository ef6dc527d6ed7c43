//! User Repository Module
//!
//! Defines the persistence interface for user records together with a
//! PostgreSQL implementation and an in-memory one. Both enforce email
//! uniqueness at the store level; a violation always surfaces as
//! `UserError::Conflict`, whatever the application checked beforehand.

use crate::user::error::{UserError, UserResult};
use crate::user::models::{NewUser, User};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository trait defining operations for user data persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user and returns its identifier
    async fn create(&self, user: NewUser) -> UserResult<Uuid>;

    /// Finds a user by their unique ID
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Finds a user by their (normalized) email address
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Sets first and last name; `None` when the user no longer exists
    async fn update_details(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> UserResult<Option<User>>;

    /// Sets the email; `None` when the user no longer exists
    async fn update_email(&self, id: Uuid, email: &str) -> UserResult<Option<User>>;

    /// Sets the avatar URL; `None` when the user no longer exists
    async fn update_avatar(&self, id: Uuid, avatar: &str) -> UserResult<Option<User>>;

    /// Cheap reachability probe for health checks
    async fn ping(&self) -> UserResult<()>;
}

/// PostgreSQL implementation of the UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PgUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUserRepository").field("pool", &"<PgPool>").finish()
    }
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<Uuid> {
        let user = user.into_user(Utc::now());

        sqlx::query(
            r"
            INSERT INTO users (id, first_name, last_name, email, gender, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.gender)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, first_name, last_name, email, gender, date_of_birth, avatar, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, first_name, last_name, email, gender, date_of_birth, avatar, role,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_details(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET first_name = $2, last_name = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, gender, date_of_birth, avatar, role,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_email(&self, id: Uuid, email: &str) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET email = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, gender, date_of_birth, avatar, role,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET avatar = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, gender, date_of_birth, avatar, role,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn ping(&self) -> UserResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    fn duplicate_email() -> UserError {
        UserError::Conflict("User email already exists.".to_string())
    }

    async fn modify<F>(&self, id: Uuid, apply: F) -> UserResult<Option<User>>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            apply(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<Uuid> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(Self::duplicate_email());
        }

        let user = user.into_user(Utc::now());
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_details(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> UserResult<Option<User>> {
        let (first_name, last_name) = (first_name.to_string(), last_name.to_string());
        self.modify(id, move |user| {
            user.first_name = first_name;
            user.last_name = last_name;
        })
        .await
    }

    async fn update_email(&self, id: Uuid, email: &str) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.id != id && u.email == email) {
            return Err(Self::duplicate_email());
        }

        Ok(users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> UserResult<Option<User>> {
        let avatar = avatar.to_string();
        self.modify(id, move |user| user.avatar = Some(avatar)).await
    }

    async fn ping(&self) -> UserResult<()> {
        Ok(())
    }
}
