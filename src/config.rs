use std::path::PathBuf;

use clap::Parser;
use eyre::OptionExt;
use eyre::bail;
use rewind_spotify_api::auth::implicit::DEFAULT_ACCOUNTS_URL;
use rewind_spotify_api::fetch::DEFAULT_API_URL;
use url::Url;

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5173/callback";
const RESERVED_PATHS: &[&str] = &["/", "/login"];

/// Sign in to Spotify and look at what you played recently.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Client ID of the Spotify app.
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: String,

    /// Must be registered on the Spotify app. The server listens on its host and port.
    #[arg(long, env = "SPOTIFY_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    pub redirect_uri: Url,

    #[arg(long, env = "SPOTIFY_ACCOUNTS_URL", default_value = DEFAULT_ACCOUNTS_URL)]
    pub accounts_url: String,

    #[arg(long, env = "SPOTIFY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File holding the pending login nonce across the redirect.
    #[arg(long, env = "REWIND_STORAGE_PATH", default_value = "rewind_storage.json")]
    pub storage_path: PathBuf,

    /// Listen address, defaults to the redirect URI's host and port.
    #[arg(long, env = "REWIND_BIND")]
    pub bind: Option<String>,

    /// Do not open the home page in a browser.
    #[arg(long, env = "REWIND_NO_OPEN")]
    pub no_open: bool,
}

impl Args {
    pub fn validate(&self) -> eyre::Result<()> {
        if !matches!(self.redirect_uri.scheme(), "http" | "https") {
            bail!("Redirect URI must be http or https: {}", self.redirect_uri);
        }
        if self.redirect_uri.host_str().is_none() {
            bail!("Redirect URI has no host: {}", self.redirect_uri);
        }
        let path = self.callback_path();
        if RESERVED_PATHS.contains(&path) || path.starts_with("/chart/") {
            bail!("Redirect URI path {} collides with an app route", path);
        }
        Ok(())
    }

    pub fn callback_path(&self) -> &str {
        self.redirect_uri.path()
    }

    pub fn bind_address(&self) -> eyre::Result<String> {
        if let Some(bind) = &self.bind {
            return Ok(bind.clone());
        }
        let host = self
            .redirect_uri
            .host_str()
            .ok_or_eyre("Redirect URI has no host")?;
        let port = self
            .redirect_uri
            .port_or_known_default()
            .ok_or_eyre("Redirect URI has no port")?;
        Ok(format!("{}:{}", host, port))
    }

    /// Root of the app on the same origin as the redirect URI.
    pub fn home_url(&self) -> Url {
        let mut url = self.redirect_uri.clone();
        url.set_path("/");
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}
