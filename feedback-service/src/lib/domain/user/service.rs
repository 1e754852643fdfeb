use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Utc;

use crate::domain::user::deadline::with_deadline;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for registration, login and profile updates.
///
/// Registration is check-then-create without locking: two concurrent
/// registrations for one email can both pass the lookup. Only a uniqueness
/// constraint in the store (the Postgres repository has one) rejects the
/// second write.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
    token_issuer: Arc<TokenIssuer>,
    store_timeout: Duration,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `token_issuer` - Signs tokens with the process-wide secret
    /// * `store_timeout` - Deadline applied to every store call
    pub fn new(
        repository: Arc<UR>,
        token_issuer: Arc<TokenIssuer>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
            token_issuer,
            store_timeout,
        }
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        with_deadline(
            self.store_timeout,
            "find_by_email",
            self.repository.find_by_email(email),
        )
        .await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        with_deadline(self.store_timeout, "find_by_id", self.repository.find_by_id(id)).await
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        self.password_hasher.hash(password).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            UserError::Hashing(e.to_string())
        })
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        if self.find_by_email(&command.email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password.as_str())?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user =
            with_deadline(self.store_timeout, "create", self.repository.create(user)).await?;

        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<String, UserError> {
        // A malformed email cannot belong to an account
        let email =
            EmailAddress::new(command.email).map_err(|_| UserError::InvalidCredentials)?;

        let user = match self.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                // Same Argon2 cost as a wrong password
                let _ = self.password_hasher.hash(&command.password);
                tracing::debug!("Login rejected: unknown email");
                return Err(UserError::InvalidCredentials);
            }
        };

        let password_matches = self
            .password_hasher
            .verify(&command.password, &user.password_hash)
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                UserError::Hashing(e.to_string())
            })?;

        if !password_matches {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .token_issuer
            .issue(user.id, user.email.as_str(), Utc::now())
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Token issuing failed");
                UserError::TokenIssue(e.to_string())
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(token)
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_email) = command.email {
            if new_email != user.email {
                if let Some(owner) = self.find_by_email(&new_email).await? {
                    if owner.id != user.id {
                        return Err(UserError::EmailAlreadyExists(new_email.to_string()));
                    }
                }
                user.email = new_email;
            }
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(new_password.as_str())?;
        }

        user.updated_at = Utc::now();

        let updated_user =
            with_deadline(self.store_timeout, "update", self.repository.update(user)).await?;

        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }
}
