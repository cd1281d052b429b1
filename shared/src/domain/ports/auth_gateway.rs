//! Driven port for the authentication provider.

use async_trait::async_trait;

use crate::domain::AuthUser;

use super::define_port_error;

define_port_error! {
    /// Errors raised by authentication gateway adapters.
    pub enum AuthGatewayError {
        /// Email/password pair was rejected.
        InvalidCredentials { message: String } =>
            "invalid credentials: {message}",
        /// Sign-up collided with an existing account.
        AccountExists { message: String } =>
            "account already exists: {message}",
        /// The operation needs a signed-in user.
        NotSignedIn =>
            "no user is signed in",
        /// Provider rejected the request for another reason.
        Rejected { message: String } =>
            "auth request rejected: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "auth transport failed: {message}",
    }
}

/// Email/password authentication with a single signed-in session.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Sign in and make the returned user current.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthGatewayError>;

    /// Create an account, set its display name and make it current.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, AuthGatewayError>;

    /// Update display name and email on the current user's auth profile.
    async fn update_profile(
        &self,
        display_name: &str,
        email: &str,
    ) -> Result<AuthUser, AuthGatewayError>;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Forget the current session.
    fn sign_out(&self);
}
