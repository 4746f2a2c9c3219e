//! Identity provider contract and the in-process session provider.
//!
//! The provider reports who is signed in and notifies subscribers on every
//! change: sign-in, sign-out and session restore.

use tokio::{sync::watch, task::JoinHandle};

use crate::{AuthError, AuthResult, Identity};

/// Source of the current identity
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in identity, if any
    fn current_identity(&self) -> Option<Identity>;

    /// Subscribes to identity changes
    fn subscribe(&self) -> AuthChanges;

    /// Returns the signed-in user's ID
    fn current_user_id(&self) -> Option<String> {
        self.current_identity().map(|identity| identity.id)
    }

    /// Returns the signed-in user's email
    fn current_user_email(&self) -> Option<String> {
        self.current_identity().map(|identity| identity.email)
    }

    /// Returns the signed-in user's display name
    fn current_user_display_name(&self) -> Option<String> {
        self.current_identity()
            .map(|identity| identity.display_name().to_string())
    }

    /// Returns the signed-in identity or `NotSignedIn`
    fn require_identity(&self) -> AuthResult<Identity> {
        self.current_identity().ok_or(AuthError::NotSignedIn)
    }
}

/// Stream of identity changes.
///
/// Each item is the identity after the change, or `None` once signed out.
#[derive(Debug, Clone)]
pub struct AuthChanges {
    receiver: watch::Receiver<Option<Identity>>,
}

impl AuthChanges {
    /// Wraps a watch receiver
    pub fn new(receiver: watch::Receiver<Option<Identity>>) -> Self {
        Self { receiver }
    }

    /// Returns the identity as of the latest change
    pub fn current(&self) -> Option<Identity> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next change.
    ///
    /// Returns `None` when the provider has been dropped.
    pub async fn changed(&mut self) -> Option<Option<Identity>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

/// Handle for a callback registered with [`on_auth_change`].
///
/// Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct AuthSubscription {
    handle: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stops delivering changes
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Invokes `callback` with the current identity and again on every change.
///
/// Must be called from within a Tokio runtime.
pub fn on_auth_change<P, F>(provider: &P, mut callback: F) -> AuthSubscription
where
    P: IdentityProvider + ?Sized,
    F: FnMut(Option<Identity>) + Send + 'static,
{
    let mut changes = provider.subscribe();
    let handle = tokio::spawn(async move {
        callback(changes.current());
        while let Some(identity) = changes.changed().await {
            callback(identity);
        }
    });
    AuthSubscription { handle }
}

/// In-process provider driven by sign-in events from the external service
#[derive(Debug)]
pub struct SessionIdentityProvider {
    sender: watch::Sender<Option<Identity>>,
}

impl Default for SessionIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionIdentityProvider {
    /// Creates a provider with nobody signed in
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Records a successful sign-in (or registration)
    pub fn sign_in(&self, identity: Identity) {
        tracing::info!(user_id = %identity.id, "User signed in");
        self.sender.send_replace(Some(identity));
    }

    /// Records a sign-out
    pub fn sign_out(&self) {
        if let Some(previous) = self.sender.send_replace(None) {
            tracing::info!(user_id = %previous.id, "User signed out");
        }
    }

    /// Restores a persisted session, notifying subscribers even if unchanged
    pub fn restore(&self, identity: Option<Identity>) {
        tracing::debug!(restored = identity.is_some(), "Session restored");
        self.sender.send_replace(identity);
    }
}

impl IdentityProvider for SessionIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> AuthChanges {
        AuthChanges::new(self.sender.subscribe())
    }
}
