pub mod bearer_token;
pub mod error;
pub mod fetch;
pub mod get_current_user;
pub mod get_recently_played;
pub mod recently_played;
pub mod storage;
pub mod track;
pub mod auth {
    pub mod access_token;
    pub mod implicit;
}
