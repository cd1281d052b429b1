//! Email/password accounts held in memory.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::AuthUser;
use crate::domain::ports::{AuthGateway, AuthGatewayError};

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
}

/// Auth gateway keeping accounts and the current session in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuthGateway {
    state: Mutex<AuthState>,
}

impl InMemoryAuthGateway {
    /// Create a gateway with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, AuthState>, AuthGatewayError> {
        self.state
            .lock()
            .map_err(|_| AuthGatewayError::transport("in-memory auth state poisoned"))
    }
}

fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn auth_user(email: &str, account: &Account) -> AuthUser {
    AuthUser {
        uid: account.uid.clone(),
        email: email.to_owned(),
        display_name: account.display_name.clone(),
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthGatewayError> {
        let key = normalise_email(email);
        let mut state = self.lock()?;
        let user = match state.accounts.get(&key) {
            Some(account) if account.password == password => auth_user(&key, account),
            _ => return Err(AuthGatewayError::invalid_credentials("INVALID_LOGIN_CREDENTIALS")),
        };
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, AuthGatewayError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthGatewayError::rejected(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }
        let key = normalise_email(email);
        let mut state = self.lock()?;
        if state.accounts.contains_key(&key) {
            return Err(AuthGatewayError::account_exists("EMAIL_EXISTS"));
        }

        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            password: password.to_owned(),
            display_name: Some(display_name.to_owned()),
        };
        let user = auth_user(&key, &account);
        state.accounts.insert(key, account);
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        display_name: &str,
        email: &str,
    ) -> Result<AuthUser, AuthGatewayError> {
        let mut state = self.lock()?;
        let current = state.current.clone().ok_or_else(AuthGatewayError::not_signed_in)?;
        let old_key = normalise_email(&current.email);
        let new_key = normalise_email(email);
        if new_key != old_key && state.accounts.contains_key(&new_key) {
            return Err(AuthGatewayError::account_exists("EMAIL_EXISTS"));
        }

        let mut account = state
            .accounts
            .remove(&old_key)
            .ok_or_else(AuthGatewayError::not_signed_in)?;
        account.display_name = Some(display_name.to_owned());
        let user = auth_user(&new_key, &account);
        state.accounts.insert(new_key, account);
        state.current = Some(user.clone());
        Ok(user)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.current.clone())
    }

    fn sign_out(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in_returns_the_same_uid() {
        let gateway = InMemoryAuthGateway::new();
        let created = gateway
            .sign_up("Dana@Example.com", "secret1", "Dana")
            .await
            .expect("sign up");
        gateway.sign_out();
        assert!(gateway.current_user().is_none());

        let signed_in = gateway
            .sign_in("dana@example.com", "secret1")
            .await
            .expect("sign in");
        assert_eq!(signed_in.uid, created.uid);
        assert_eq!(gateway.current_user(), Some(signed_in));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let gateway = InMemoryAuthGateway::new();
        gateway
            .sign_up("dana@example.com", "secret1", "Dana")
            .await
            .expect("sign up");

        let error = gateway
            .sign_in("dana@example.com", "secret2")
            .await
            .expect_err("password mismatch");
        assert!(matches!(error, AuthGatewayError::InvalidCredentials { .. }));
    }

    #[tokio::test]
    async fn duplicate_email_and_weak_password_are_rejected() {
        let gateway = InMemoryAuthGateway::new();
        gateway
            .sign_up("dana@example.com", "secret1", "Dana")
            .await
            .expect("sign up");

        let duplicate = gateway
            .sign_up("dana@example.com", "secret1", "Dana")
            .await
            .expect_err("duplicate");
        assert!(matches!(duplicate, AuthGatewayError::AccountExists { .. }));

        let weak = gateway
            .sign_up("other@example.com", "12345", "Other")
            .await
            .expect_err("weak password");
        assert!(matches!(weak, AuthGatewayError::Rejected { .. }));
    }

    #[tokio::test]
    async fn profile_update_rekeys_the_account() {
        let gateway = InMemoryAuthGateway::new();
        gateway
            .sign_up("dana@example.com", "secret1", "Dana")
            .await
            .expect("sign up");

        let updated = gateway
            .update_profile("Dana K", "dana.k@example.com")
            .await
            .expect("update profile");
        assert_eq!(updated.display_name.as_deref(), Some("Dana K"));

        gateway.sign_out();
        gateway
            .sign_in("dana.k@example.com", "secret1")
            .await
            .expect("new email signs in");
    }
}
