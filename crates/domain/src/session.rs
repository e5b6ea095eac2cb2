use crate::{DeleteError, ReadError, User};

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn get_session(&self) -> Result<User, ReadError>;
    async fn request_session(&self, user: User) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}

/// Boundary to the authentication provider.
///
/// `current_user` fails with [`crate::StorageError::NoSession`] while nobody is
/// signed in.
#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn current_user(&self) -> Result<User, ReadError>;
    async fn login(&self, user: User) -> Result<User, ReadError>;
    async fn logout(&self) -> Result<(), DeleteError>;
}

/// Snapshot of the authentication state as published by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}
