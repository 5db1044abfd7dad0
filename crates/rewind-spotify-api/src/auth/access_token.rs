use serde::Deserialize;
use serde::Serialize;

use crate::bearer_token::BearerToken;

/// Token handed back in the redirect fragment of an implicit grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: BearerToken,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub state: String,
}

/// What the page shows under "authenticated": the token, plus the profile once it arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    #[serde(flatten)]
    pub token: AccessToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
}

impl TokenState {
    pub fn new(token: AccessToken) -> Self {
        TokenState {
            token,
            profile: None,
        }
    }

    pub fn merge_profile(&mut self, profile: serde_json::Value) {
        self.profile = Some(profile);
    }
}
