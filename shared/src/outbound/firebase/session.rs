//! Signed-in session shared between the Firebase adapters.

use std::sync::{Arc, RwLock};

use crate::domain::AuthUser;

#[derive(Debug, Clone)]
struct SignedIn {
    user: AuthUser,
    id_token: String,
}

/// Cloneable handle to the current Firebase session.
#[derive(Debug, Clone, Default)]
pub struct FirebaseSession {
    inner: Arc<RwLock<Option<SignedIn>>>,
}

impl FirebaseSession {
    /// Create a handle with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn store(&self, user: AuthUser, id_token: String) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(SignedIn { user, id_token });
        }
    }

    pub(super) fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<AuthUser> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|signed_in| signed_in.user.clone()))
    }

    /// Bearer token for the signed-in user, if any.
    pub fn id_token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|signed_in| signed_in.id_token.clone()))
    }
}
