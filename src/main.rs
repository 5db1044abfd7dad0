use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;
use rewind_init::init;
use rewind_spotify_api::auth::implicit::ImplicitGrant;
use rewind_spotify_api::fetch::ApiClient;
use rewind_spotify_api::storage::FileStorage;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::info;
use tracing::warn;

mod config;
mod server;
mod session;
mod view;

use config::Args;
use server::AppState;
use session::Session;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init()?;

    let args = Args::parse();
    args.validate()?;

    let grant = ImplicitGrant::new(args.client_id.clone(), args.redirect_uri.clone())
        .with_accounts_url(args.accounts_url.clone());
    let state = AppState {
        session: Arc::new(RwLock::new(Session::new(0))),
        grant: Arc::new(grant),
        storage: Arc::new(FileStorage::new(&args.storage_path)),
        api: ApiClient::new(args.api_url.clone()),
    };

    let addr = args.bind_address()?;
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;
    let home = args.home_url();
    info!("Listening on {} (open {})", addr, home);

    if !args.no_open {
        if let Err(e) = open::that(home.as_str()) {
            warn!("Could not open a browser: {}", e);
        }
    }

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
