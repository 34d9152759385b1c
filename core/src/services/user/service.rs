//! Main user service implementation

use sk_shared::utils::email::{mask_email, normalize_email};
use tracing::{debug, info};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::UserRepository;

use super::config::UserServiceConfig;

/// User-facing registration messages
pub mod messages {
    pub const EMAIL_REQUIRED: &str = "An email is required.";
    pub const EMAIL_INVALID: &str = "A valid email is required.";
    pub const PASSWORD_REQUIRED: &str = "A password is required.";

    pub fn password_too_short(min: usize) -> String {
        format!("The password must be at least {} characters.", min)
    }
}

/// Input for [`UserService::create_user`]
#[derive(Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Service for registering users and checking their credentials
pub struct UserService<U: UserRepository> {
    repository: U,
    config: UserServiceConfig,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repository: U, config: UserServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Access the underlying repository
    pub fn repository(&self) -> &U {
        &self.repository
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// * `DomainError::Validation` - Every problem with the email and password
    /// * `AuthError::UserAlreadyExists` - The email is taken
    pub async fn create_user(&self, request: CreateUserRequest) -> DomainResult<User> {
        let email = normalize_email(&request.email);
        self.validate(&email, &request.password)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = hash_password(request.password, self.config.bcrypt_cost).await?;
        let user = User::new(
            email,
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            password_hash,
        );

        self.repository.create(&user).await?;
        info!(user_id = %user.id, email = %mask_email(&user.email), "User registered");

        Ok(user)
    }

    /// Checks an email and password pair.
    ///
    /// Unknown emails and wrong passwords fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<User> {
        let email = normalize_email(email);

        let user = match self.repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!(email = %mask_email(&email), "Login for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_user(&self, id: Uuid) -> DomainResult<Option<User>> {
        self.repository.find_by_id(id).await
    }

    fn validate(&self, email: &str, password: &str) -> DomainResult<()> {
        let mut errors = Vec::new();

        if email.is_empty() {
            errors.push(messages::EMAIL_REQUIRED.to_string());
        } else if !email.validate_email() {
            errors.push(messages::EMAIL_INVALID.to_string());
        }

        if password.is_empty() {
            errors.push(messages::PASSWORD_REQUIRED.to_string());
        } else if password.chars().count() < self.config.min_password_length {
            errors.push(messages::password_too_short(self.config.min_password_length));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation { errors })
        }
    }
}

// bcrypt is deliberately slow; keep it off the async workers
async fn hash_password(password: String, cost: u32) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> DomainResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("Password check task failed: {}", e)))?
        .map_err(|e| DomainError::internal(format!("Failed to verify password: {}", e)))
}
