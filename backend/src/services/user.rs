//! User management
//!
//! Usernames are checked before hashing so a duplicate does not pay for an
//! Argon2 round; the store's own unique check still guards against races.

use crate::error::ApiError;
use crate::services::PasswordService;
use crate::storage::Store;
use fitforge_shared::{NewUser, User, UserFilter, UserPatch};
use tracing::info;

/// User service; passwords are hashed here and nowhere else
pub struct UserService;

impl UserService {
    /// Create a user after checking the username is free
    pub async fn create(store: &Store, mut new: NewUser) -> Result<User, ApiError> {
        Self::ensure_username_free(store, &new.username, None).await?;

        new.password = PasswordService::hash_async(new.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = store.repo::<User>().create(new).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Merge a patch, re-hashing the password when one is supplied
    pub async fn update(store: &Store, id: i32, mut patch: UserPatch) -> Result<User, ApiError> {
        if let Some(username) = patch.username.as_deref() {
            Self::ensure_username_free(store, username, Some(id)).await?;
        }
        if let Some(password) = patch.password.take() {
            patch.password = Some(
                PasswordService::hash_async(password)
                    .await
                    .map_err(ApiError::Internal)?,
            );
        }

        store
            .repo::<User>()
            .update(id, patch)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_username(store: &Store, username: &str) -> Result<Option<User>, ApiError> {
        let filter = UserFilter {
            username: Some(username.to_string()),
        };
        Ok(store.repo::<User>().list(&filter).await?.into_iter().next())
    }

    async fn ensure_username_free(
        store: &Store,
        username: &str,
        except: Option<i32>,
    ) -> Result<(), ApiError> {
        match Self::find_by_username(store, username).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(ApiError::Conflict("Username already exists".to_string()))
            }
            _ => Ok(()),
        }
    }
}
