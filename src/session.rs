use std::sync::Arc;

use rewind_chart::ChartState;
use rewind_spotify_api::auth::access_token::TokenState;
use rewind_spotify_api::auth::implicit::AuthState;
use rewind_spotify_api::bearer_token::BearerToken;
use rewind_spotify_api::error::FetchError;
use rewind_spotify_api::fetch::ApiClient;
use rewind_spotify_api::get_current_user::get_current_user;
use rewind_spotify_api::get_recently_played::get_recently_played;
use rewind_spotify_api::recently_played::RecentlyPlayed;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

pub type SharedSession = Arc<RwLock<Session>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to fetch recently played tracks: {0}")]
    HistoryFetchFailed(#[source] FetchError),
    #[error("Failed to fetch the user profile: {0}")]
    ProfileFetchFailed(#[source] FetchError),
}

/// Everything one page load knows. Replaced wholesale when the page is loaded again.
#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    pub auth: AuthState,
    pub token: Option<TokenState>,
    pub recently_played: Option<RecentlyPlayed>,
    pub error: Option<String>,
    pub chart: ChartState,
    pub in_flight: usize,
}

impl Session {
    pub fn new(generation: u64) -> Self {
        Session {
            generation,
            ..Session::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start over as a new page load.
    pub fn reload(&mut self) {
        *self = Session::new(self.generation + 1);
    }

    /// Move to the outcome of a callback. Returns the token to fetch with on login.
    pub fn enter(&mut self, state: AuthState) -> Option<BearerToken> {
        let bearer = match &state {
            AuthState::LoggedIn(token) => {
                self.token = Some(TokenState::new(token.clone()));
                self.in_flight = 2;
                Some(token.access_token.clone())
            }
            AuthState::Error(e) => {
                self.error = Some(e.to_string());
                None
            }
            _ => None,
        };
        self.auth = state;
        bearer
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping result for stale session {} (now {})",
                generation, self.generation
            );
            return false;
        }
        true
    }

    /// Profile failures are logged and otherwise invisible.
    pub fn apply_profile(&mut self, generation: u64, result: Result<serde_json::Value, FetchError>) {
        if !self.is_current(generation) {
            return;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(profile) => {
                info!("Profile loaded");
                if let Some(token) = self.token.as_mut() {
                    token.merge_profile(profile);
                }
            }
            Err(e) => warn!("{}", SessionError::ProfileFetchFailed(e)),
        }
    }

    /// A failed history fetch keeps whatever tracks were shown and sets the one error message.
    pub fn apply_history(&mut self, generation: u64, result: Result<RecentlyPlayed, FetchError>) {
        if !self.is_current(generation) {
            return;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(played) => {
                info!("Loaded {} recently played tracks", played.page.items.len());
                self.recently_played = Some(played);
            }
            Err(e) => {
                let e = SessionError::HistoryFetchFailed(e);
                error!("{}", e);
                self.error = Some(e.to_string());
            }
        }
    }
}

/// Fetch the profile and the play history concurrently, applying each as it lands.
pub async fn load_user_data(
    session: SharedSession,
    api: ApiClient,
    bearer: BearerToken,
    generation: u64,
) {
    let profile = async {
        let result = get_current_user(&api, &bearer).await;
        session.write().await.apply_profile(generation, result);
    };
    let history = async {
        let result = get_recently_played(&api, &bearer).await;
        session.write().await.apply_history(generation, result);
    };
    tokio::join!(profile, history);
}
