//! Authentication provider
//!
//! Holds the signed-in user and publishes every change of the authentication
//! state to its subscribers.

use gymbook_domain as domain;
use log::{debug, info};
use tokio::sync::watch;

pub struct Auth {
    state: watch::Sender<domain::AuthState>,
}

impl Auth {
    /// The state is loading until [`Auth::restore`] has been called.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(domain::AuthState::loading()),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<domain::AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> domain::AuthState {
        self.state.borrow().clone()
    }

    /// Finish loading with a previously persisted user, if any.
    pub fn restore(&self, user: Option<domain::User>) {
        debug!("restoring session: {}", user.is_some());
        self.state.send_replace(match user {
            Some(user) => domain::AuthState::signed_in(user),
            None => domain::AuthState::signed_out(),
        });
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::new()
    }
}

impl domain::SessionRepository for Auth {
    async fn current_user(&self) -> Result<domain::User, domain::ReadError> {
        self.state
            .borrow()
            .user
            .clone()
            .ok_or(domain::ReadError::Storage(domain::StorageError::NoSession))
    }

    async fn login(&self, user: domain::User) -> Result<domain::User, domain::ReadError> {
        info!("signed in as {}", user.display_name());
        self.state
            .send_replace(domain::AuthState::signed_in(user.clone()));
        Ok(user)
    }

    async fn logout(&self) -> Result<(), domain::DeleteError> {
        if let Some(user) = self.state.send_replace(domain::AuthState::signed_out()).user {
            info!("signed out {}", user.display_name());
        }
        Ok(())
    }
}
