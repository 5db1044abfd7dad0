use crate::bearer_token::BearerToken;
use crate::error::FetchError;
use crate::fetch::ApiClient;
use crate::recently_played::RecentlyPlayed;

pub const RECENTLY_PLAYED_PATH: &str = "me/player/recently-played";

/// https://developer.spotify.com/documentation/web-api/reference/get-recently-played
pub async fn get_recently_played(
    api: &ApiClient,
    bearer: &BearerToken,
) -> Result<RecentlyPlayed, FetchError> {
    let raw: serde_json::Value = api.fetch(RECENTLY_PLAYED_PATH, bearer).await?;
    RecentlyPlayed::from_raw(raw).map_err(|source| FetchError::Decode {
        url: format!("{}/{}", api.base_url(), RECENTLY_PLAYED_PATH),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_one_page_of_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me/player/recently-played")
            .match_header("authorization", "Bearer AT1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items":[{"track":{"name":"Song","artists":[{"name":"Band"}],"album":{"name":"LP","images":[]}},"played_at":"2024-05-01T10:00:00Z"}],"next":null,"limit":20}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let api = ApiClient::new(server.url());
        let played = get_recently_played(&api, &BearerToken::from("AT1"))
            .await
            .unwrap();

        assert_eq!(played.page.items.len(), 1);
        assert_eq!(played.page.items[0].track.artist_names(), "Band");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_is_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/me/player/recently-played")
            .with_status(403)
            .create_async()
            .await;

        let api = ApiClient::new(server.url());
        let err = get_recently_played(&api, &BearerToken::from("AT1"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
    }
}
