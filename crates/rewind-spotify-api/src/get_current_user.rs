use crate::bearer_token::BearerToken;
use crate::error::FetchError;
use crate::fetch::ApiClient;

pub const CURRENT_USER_PATH: &str = "me";

/// https://developer.spotify.com/documentation/web-api/reference/get-current-users-profile
///
/// The profile is only ever displayed, so it stays untyped JSON.
pub async fn get_current_user(
    api: &ApiClient,
    bearer: &BearerToken,
) -> Result<serde_json::Value, FetchError> {
    api.fetch(CURRENT_USER_PATH, bearer).await
}
