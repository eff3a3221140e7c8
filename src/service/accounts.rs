//! Registration, login, and resolving the caller behind a bearer token.

use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthError, TokenIssuer};
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::service::validation;
use crate::state::AppState;
use crate::store::Store;

/// Input for every path that creates a user. A password is always required
/// and always hashed before it reaches the store.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

pub struct AccountService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenIssuer,
}

impl<'a> AccountService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            store: state.store.as_ref(),
            tokens: state.tokens.as_ref(),
        }
    }

    /// Validate, hash the password, and insert. A taken email is a conflict;
    /// the existing account is left untouched.
    pub async fn register(&self, input: RegisterUser) -> Result<User, AppError> {
        let name = validation::required_text("name", &input.name, validation::NAME_MAX)?;
        let email = validation::email("email", &input.email)?;
        validation::password("password", &input.password)?;
        let address = validation::required_text("address", &input.address, validation::ADDRESS_MAX)?;

        let password_hash = auth::hash_password(&input.password)?;
        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password_hash,
                address,
            })
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let record = self.store.user_by_email(email.trim()).await?;
        match record {
            Some(record) if auth::verify_password(password, &record.password_hash) => Ok(record.user),
            Some(_) => Err(AuthError::InvalidCredentials.into()),
            None => {
                if let Some(decoy) = auth::decoy_hash() {
                    let _ = auth::verify_password(password, decoy);
                }
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AppError> {
        let user = self.authenticate(email, password).await?;
        let access_token = self.tokens.issue(&user.email)?;
        tracing::info!(user_id = user.id, "access token issued");
        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Verify the token, then re-load its subject; a subject that no longer
    /// resolves is rejected.
    pub async fn resolve_current_user(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.verify(token)?;
        let record = self
            .store
            .user_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;
        Ok(record.user)
    }
}
