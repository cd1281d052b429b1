//! Reqwest-backed Identity Toolkit adapter.
//!
//! Owns transport details only: endpoint construction, JSON bodies, mapping
//! of Identity Toolkit error codes to [`AuthGatewayError`] variants, and
//! recording the session for the Firestore adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::FirebaseSession;
use crate::domain::AuthUser;
use crate::domain::ports::{AuthGateway, AuthGatewayError};
use crate::outbound::http_support::status_message;

/// Public Identity Toolkit endpoint.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Auth gateway backed by the Firebase Identity Toolkit REST API.
pub struct FirebaseAuthHttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
    session: FirebaseSession,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponseDto {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
struct ErrorBodyDto {
    message: String,
}

impl FirebaseAuthHttpGateway {
    /// Build a gateway with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        api_key: impl Into<String>,
        timeout: Duration,
        session: FirebaseSession,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            session,
        })
    }

    /// Session handle shared with the Firestore adapter.
    pub fn session(&self) -> &FirebaseSession {
        &self.session
    }

    fn endpoint(&self, action: &str) -> Result<Url, AuthGatewayError> {
        let mut url = Url::parse(&format!("{}/accounts:{action}", self.base_url)).map_err(
            |error| AuthGatewayError::rejected(format!("invalid identity toolkit url: {error}")),
        )?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn call(&self, action: &str, body: &Value) -> Result<AccountResponseDto, AuthGatewayError> {
        let response = self
            .client
            .post(self.endpoint(action)?)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_error_response(status, bytes.as_ref());
            debug!(action, %error, "identity toolkit call failed");
            return Err(error);
        }

        serde_json::from_slice(bytes.as_ref()).map_err(|error| {
            AuthGatewayError::rejected(format!("invalid identity toolkit response: {error}"))
        })
    }

    fn remember(&self, account: AccountResponseDto, fallback_token: Option<String>) -> AuthUser {
        let user = AuthUser {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
        };
        if let Some(token) = account.id_token.or(fallback_token) {
            self.session.store(user.clone(), token);
        }
        user
    }
}

#[async_trait]
impl AuthGateway for FirebaseAuthHttpGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthGatewayError> {
        let account = self
            .call(
                "signInWithPassword",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        if account.id_token.is_none() {
            return Err(AuthGatewayError::rejected("sign-in response lacked an id token"));
        }
        Ok(self.remember(account, None))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, AuthGatewayError> {
        let created = self
            .call(
                "signUp",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let token = created
            .id_token
            .ok_or_else(|| AuthGatewayError::rejected("sign-up response lacked an id token"))?;

        let updated = self
            .call(
                "update",
                &json!({
                    "idToken": token,
                    "displayName": display_name,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(self.remember(updated, Some(token)))
    }

    async fn update_profile(
        &self,
        display_name: &str,
        email: &str,
    ) -> Result<AuthUser, AuthGatewayError> {
        let token = self
            .session
            .id_token()
            .ok_or_else(AuthGatewayError::not_signed_in)?;
        let updated = self
            .call(
                "update",
                &json!({
                    "idToken": token,
                    "displayName": display_name,
                    "email": email,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(self.remember(updated, Some(token)))
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session.user()
    }

    fn sign_out(&self) {
        self.session.clear();
    }
}

fn map_transport_error(error: reqwest::Error) -> AuthGatewayError {
    AuthGatewayError::transport(error.to_string())
}

fn map_error_response(status: StatusCode, body: &[u8]) -> AuthGatewayError {
    let Ok(envelope) = serde_json::from_slice::<ErrorEnvelopeDto>(body) else {
        let message = status_message(status, body);
        return if status.is_server_error() {
            AuthGatewayError::transport(message)
        } else {
            AuthGatewayError::rejected(message)
        };
    };

    let message = envelope.error.message;
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_owned();
    match code.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
        | "USER_DISABLED" | "INVALID_EMAIL" => AuthGatewayError::invalid_credentials(message),
        "EMAIL_EXISTS" => AuthGatewayError::account_exists(message),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => {
            AuthGatewayError::not_signed_in()
        }
        _ => AuthGatewayError::rejected(message),
    }
}
