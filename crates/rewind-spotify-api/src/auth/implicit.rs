use std::collections::HashMap;

use eyre::Result;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

use crate::auth::access_token::AccessToken;
use crate::bearer_token::BearerToken;
use crate::error::AuthError;
use crate::storage::SessionStorage;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
/// Storage key of the nonce sent as `state`.
pub const AUTH_STATE_KEY: &str = "spotify_auth_state";
pub const NONCE_LEN: usize = 16;
pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-read-recently-played",
];

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    LoggedOut,
    PendingRedirect,
    AwaitingCallback,
    LoggedIn(AccessToken),
    Error(AuthError),
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::LoggedIn(_))
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            AuthState::LoggedIn(token) => Some(token),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AuthError> {
        match self {
            AuthState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Client side of the OAuth implicit grant (`response_type=token`).
#[derive(Debug, Clone)]
pub struct ImplicitGrant {
    client_id: String,
    redirect_uri: Url,
    accounts_url: String,
}

impl ImplicitGrant {
    pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> Self {
        ImplicitGrant {
            client_id: client_id.into(),
            redirect_uri,
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }

    pub fn with_accounts_url(mut self, accounts_url: impl Into<String>) -> Self {
        self.accounts_url = accounts_url.into();
        self
    }

    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    pub fn authorize_url(&self, nonce: &str) -> Result<Url> {
        let base = format!("{}/authorize", self.accounts_url.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &base,
            &[
                ("response_type", "token"),
                ("client_id", self.client_id.as_str()),
                ("scope", SCOPES.join(" ").as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", nonce),
            ],
        )?;
        Ok(url)
    }

    /// Store a fresh nonce and return the URL the browser must be sent to.
    pub async fn initiate_login<S: SessionStorage>(&self, storage: &S) -> Result<Url> {
        let nonce = generate_nonce(NONCE_LEN);
        storage.put(AUTH_STATE_KEY, &nonce).await?;
        let url = self.authorize_url(&nonce)?;
        info!("Redirecting to {} for auth", self.accounts_url);
        Ok(url)
    }

    /// Decide the outcome of a redirect back from the authorize endpoint.
    ///
    /// `fragment` is everything after `#`, with or without the `#`. The stored nonce is
    /// deleted only when the callback logs in, so a failed or forged callback cannot spend
    /// the nonce of a login that is still in progress.
    pub async fn handle_callback<S: SessionStorage>(
        &self,
        storage: &S,
        fragment: &str,
    ) -> Result<AuthState> {
        let Some(params) = parse_fragment(fragment) else {
            debug!("Callback without fragment");
            return Ok(AuthState::LoggedOut);
        };
        let stored = storage.get(AUTH_STATE_KEY).await?;

        if let Some(error) = params.get("error") {
            warn!("Authorize endpoint returned error: {}", error);
            return Ok(AuthState::Error(AuthError::AuthDenied(error.clone())));
        }

        let returned = params.get("state");
        match (returned, stored.as_ref()) {
            (Some(returned), Some(stored)) if returned == stored => {}
            _ => {
                warn!("Callback state does not match the stored nonce");
                return Ok(AuthState::Error(AuthError::StateMismatch));
            }
        }

        let Some(access_token) = params.get("access_token").filter(|t| !t.is_empty()) else {
            warn!("Callback carried neither a token nor an error");
            return Ok(AuthState::LoggedOut);
        };

        let token = AccessToken {
            access_token: BearerToken(access_token.clone()),
            token_type: params.get("token_type").cloned(),
            expires_in: params.get("expires_in").and_then(|s| s.parse().ok()),
            state: params.get("state").cloned().unwrap_or_default(),
        };
        storage.take(AUTH_STATE_KEY).await?;
        info!(
            "Logged in: token len={}, expires in {:?}s",
            access_token.len(),
            token.expires_in
        );
        Ok(AuthState::LoggedIn(token))
    }
}

pub fn generate_nonce(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Parse a URL fragment as `application/x-www-form-urlencoded`.
///
/// Returns `None` for an absent or empty fragment. Later duplicates win.
pub fn parse_fragment(fragment: &str) -> Option<HashMap<String, String>> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    if fragment.is_empty() {
        return None;
    }
    Some(
        url::form_urlencoded::parse(fragment.as_bytes())
            .into_owned()
            .collect(),
    )
}
