use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::handlers::{LoginRequest, RegisterUserRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::validation::{
    parse_user_id, user_not_found, validate_login_request, validate_register_request,
};
use crate::db::gateway::UserStore;
use crate::db::models::{Session, User};
use crate::error::{AppError, StoreError};

/// Registration, login and profile lookup on top of a [`UserStore`].
pub struct AuthService {
    store: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Verifies credentials and returns the user's session token, issuing one if none exists.
    ///
    /// The session lookup and insert are not atomic: concurrent first logins of one
    /// user may each insert a row, and later lookups return whichever row the store
    /// yields first.
    pub async fn login(&self, req: &LoginRequest) -> Result<String, AppError> {
        validate_login_request(req)?;

        let user = self.get_user(&req.id).await?;
        if !verify_password(&user.password_hash, &req.password)? {
            return Err(AppError::InvalidInput("incorrect password".into()));
        }

        match self.store.get_session(user.id).await {
            Ok(token) => {
                debug!("Reusing session for user {}", user.id);
                Ok(token)
            }
            Err(StoreError::NoUser) => {
                let session = Session::new(user.id);
                self.store.add_session(&session).await?;
                info!("Issued new session for user {}", user.id);
                Ok(session.token)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validates and stores a new user, returning the assigned id.
    pub async fn register(&self, req: &RegisterUserRequest) -> Result<Uuid, AppError> {
        let new_user = validate_register_request(req)?;
        let password_hash = hash_password(&new_user.password)?;

        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            birth_date: new_user.birth_date,
            sex: new_user.sex,
            biography: new_user.biography,
            city: new_user.city,
            password_hash,
        };

        self.store.add_users(std::slice::from_ref(&user)).await?;
        info!("Registered user {}", user.id);

        Ok(user.id)
    }

    /// Looks up one user; an empty result is [`AppError::UserNotFound`].
    pub async fn get_user(&self, id: &str) -> Result<User, AppError> {
        if id.is_empty() {
            return Err(AppError::InvalidInput("id is required".into()));
        }

        let user_id = parse_user_id(id)?;
        self.store
            .get_users(&[user_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| user_not_found(id))
    }
}
