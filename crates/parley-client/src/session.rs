//! User session lifecycle.
//!
//! A [`UserSession`] is created at sign-in and passed explicitly to every
//! service that needs the user's identity or display name; there is no
//! process-wide current-user state.  Signing out consumes the session.

use tracing::info;

use parley_shared::{Sender, UserId};

use crate::backend::{IdentityProvider, PreferenceStore};
use crate::error::{ClientError, Result};

/// The signed-in user: provider-assigned id plus chosen display name.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: UserId,
    pub display_name: String,
}

impl UserSession {
    /// Sign in under `display_name`.  The name is stored in the preference
    /// store so the next launch can restore the session without prompting.
    pub async fn sign_in<I, P>(provider: &I, prefs: &P, display_name: &str) -> Result<Self>
    where
        I: IdentityProvider,
        P: PreferenceStore,
    {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ClientError::EmptyDisplayName);
        }

        prefs.set_display_name(display_name);
        let user_id = provider.sign_in_anonymously().await?;

        info!(user = %user_id, name = %display_name, "Signed in");
        Ok(Self {
            user_id,
            display_name: display_name.to_string(),
        })
    }

    /// Restore a session from a previously stored display name.  Returns
    /// `None` when no name is stored, in which case the caller prompts for
    /// one and calls [`UserSession::sign_in`].
    pub async fn restore<I, P>(provider: &I, prefs: &P) -> Result<Option<Self>>
    where
        I: IdentityProvider,
        P: PreferenceStore,
    {
        let Some(display_name) = prefs.display_name() else {
            return Ok(None);
        };

        let user_id = provider.sign_in_anonymously().await?;
        info!(user = %user_id, name = %display_name, "Session restored");
        Ok(Some(Self {
            user_id,
            display_name,
        }))
    }

    /// Sign out, consuming the session.  The stored display name is kept so
    /// the next launch still skips the name prompt.
    pub async fn sign_out<I: IdentityProvider>(self, provider: &I) -> Result<()> {
        provider.sign_out().await?;
        info!(user = %self.user_id, "Signed out");
        Ok(())
    }

    /// This user as a message sender.
    pub fn sender(&self) -> Sender {
        Sender::new(self.user_id.clone(), self.display_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn sign_in_stores_the_name_and_yields_an_id() {
        let backend = MemoryBackend::new();
        let session = UserSession::sign_in(&backend, &backend, "Ada").await.unwrap();

        assert_eq!(session.display_name, "Ada");
        assert_eq!(backend.display_name().as_deref(), Some("Ada"));
        assert!(!session.user_id.as_str().is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let backend = MemoryBackend::new();
        let err = UserSession::sign_in(&backend, &backend, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptyDisplayName));
        assert_eq!(backend.display_name(), None);
    }

    #[tokio::test]
    async fn restore_requires_a_stored_name() {
        let backend = MemoryBackend::new();
        assert!(UserSession::restore(&backend, &backend)
            .await
            .unwrap()
            .is_none());

        backend.set_display_name("Grace");
        let session = UserSession::restore(&backend, &backend)
            .await
            .unwrap()
            .expect("stored name restores a session");
        assert_eq!(session.display_name, "Grace");
    }

    #[tokio::test]
    async fn sign_out_keeps_the_stored_name() {
        let backend = MemoryBackend::new();
        let session = UserSession::sign_in(&backend, &backend, "Ada").await.unwrap();
        session.sign_out(&backend).await.unwrap();
        assert_eq!(backend.display_name().as_deref(), Some("Ada"));
    }
}
