use std::sync::Arc;

use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use rewind_chart::SeriesId;
use rewind_chart::UnknownSeries;
use rewind_spotify_api::auth::implicit::AuthState;
use rewind_spotify_api::auth::implicit::ImplicitGrant;
use rewind_spotify_api::fetch::ApiClient;
use rewind_spotify_api::storage::SessionStorage;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::error;
use tracing::info;

use crate::session::Session;
use crate::session::SharedSession;
use crate::session::load_user_data;
use crate::view::render_callback_relay;
use crate::view::render_chart;
use crate::view::render_page;

pub struct AppState<S> {
    pub session: SharedSession,
    pub grant: Arc<ImplicitGrant>,
    pub storage: Arc<S>,
    pub api: ApiClient,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            session: self.session.clone(),
            grant: self.grant.clone(),
            storage: self.storage.clone(),
            api: self.api.clone(),
        }
    }
}

/// Handler failure that is not the user's fault.
pub struct AppError(eyre::Report);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:?}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl<E: Into<eyre::Report>> From<E> for AppError {
    fn from(e: E) -> Self {
        AppError(e.into())
    }
}

pub fn router<S>(state: AppState<S>) -> Router
where
    S: SessionStorage + 'static,
{
    let callback_path = state.grant.redirect_uri().path().to_string();
    Router::new()
        .route("/", get(home::<S>))
        .route("/login", get(login::<S>))
        .route(&callback_path, get(callback_page::<S>).post(callback::<S>))
        .route("/chart/hover/:id", post(hover::<S>))
        .route("/chart/leave", post(leave::<S>))
        .route("/chart/select/:id", post(select::<S>))
        .route("/chart/resize", post(resize::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home<S: SessionStorage + 'static>(State(app): State<AppState<S>>) -> Html<String> {
    Html(render_page(&*app.session.read().await))
}

async fn login<S: SessionStorage + 'static>(State(app): State<AppState<S>>) -> Result<Redirect, AppError> {
    let url = app.grant.initiate_login(app.storage.as_ref()).await?;
    app.session.write().await.auth = AuthState::PendingRedirect;
    Ok(Redirect::to(url.as_str()))
}

/// A load of the redirect URI is a fresh page: previous session state is gone.
async fn callback_page<S: SessionStorage + 'static>(State(app): State<AppState<S>>) -> Html<String> {
    let mut session = app.session.write().await;
    session.reload();
    session.auth = AuthState::AwaitingCallback;
    Html(render_callback_relay())
}

async fn callback<S: SessionStorage + 'static>(
    State(app): State<AppState<S>>,
    fragment: String,
) -> Result<StatusCode, AppError> {
    let mut session = app.session.write().await;
    let outcome = app
        .grant
        .handle_callback(app.storage.as_ref(), &fragment)
        .await?;
    if let Some(bearer) = session.enter(outcome) {
        let generation = session.generation();
        info!("Fetching profile and recently played tracks");
        tokio::spawn(load_user_data(
            app.session.clone(),
            app.api.clone(),
            bearer,
            generation,
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn chart_response(session: &Session) -> Html<String> {
    Html(render_chart(&session.chart))
}

type ChartResult = Result<Html<String>, (StatusCode, String)>;

/// The chart only exists on the logged-in page.
fn require_login(session: &Session) -> Result<(), (StatusCode, String)> {
    if session.auth.is_logged_in() {
        Ok(())
    } else {
        Err((StatusCode::CONFLICT, "Log in to use the chart".to_string()))
    }
}

fn not_found(e: UnknownSeries) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, e.to_string())
}

async fn hover<S: SessionStorage + 'static>(
    State(app): State<AppState<S>>,
    Path(id): Path<u8>,
) -> ChartResult {
    let mut session = app.session.write().await;
    require_login(&session)?;
    session.chart.hover(SeriesId(id)).map_err(not_found)?;
    Ok(chart_response(&session))
}

async fn leave<S: SessionStorage + 'static>(State(app): State<AppState<S>>) -> ChartResult {
    let mut session = app.session.write().await;
    require_login(&session)?;
    session.chart.leave();
    Ok(chart_response(&session))
}

async fn select<S: SessionStorage + 'static>(
    State(app): State<AppState<S>>,
    Path(id): Path<u8>,
) -> ChartResult {
    let mut session = app.session.write().await;
    require_login(&session)?;
    session.chart.toggle_selection(SeriesId(id)).map_err(not_found)?;
    Ok(chart_response(&session))
}

#[derive(Debug, Deserialize)]
struct ResizeParams {
    width: f64,
}

async fn resize<S: SessionStorage + 'static>(
    State(app): State<AppState<S>>,
    Query(params): Query<ResizeParams>,
) -> ChartResult {
    let mut session = app.session.write().await;
    require_login(&session)?;
    session.chart.resize(params.width);
    Ok(chart_response(&session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::header;
    use rewind_spotify_api::auth::access_token::AccessToken;
    use rewind_spotify_api::auth::implicit::AUTH_STATE_KEY;
    use rewind_spotify_api::bearer_token::BearerToken;
    use rewind_spotify_api::storage::MemoryStorage;
    use tokio::sync::RwLock;
    use tower::ServiceExt;
    use url::Url;

    fn app_state(api_url: &str) -> AppState<MemoryStorage> {
        let grant = ImplicitGrant::new(
            "client-123",
            Url::parse("http://127.0.0.1:5173/callback").unwrap(),
        )
        .with_accounts_url("https://accounts.example.test");
        AppState {
            session: Arc::new(RwLock::new(Session::new(0))),
            grant: Arc::new(grant),
            storage: Arc::new(MemoryStorage::new()),
            api: ApiClient::new(api_url),
        }
    }

    async fn logged_in_state() -> AppState<MemoryStorage> {
        let state = app_state("http://unused.test");
        state
            .session
            .write()
            .await
            .enter(AuthState::LoggedIn(AccessToken {
                access_token: BearerToken::from("AT1"),
                token_type: Some("Bearer".to_string()),
                expires_in: Some(3600),
                state: "S1".to_string(),
            }));
        state
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn login_redirects_to_the_authorize_endpoint() {
        let state = app_state("http://unused.test");
        let response = router(state.clone())
            .oneshot(get_req("/login"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://accounts.example.test/authorize?"));
        assert!(location.contains("response_type=token"));

        let nonce = state.storage.get(AUTH_STATE_KEY).await.unwrap().unwrap();
        assert!(location.contains(&format!("state={nonce}")));
        assert_eq!(state.session.read().await.auth, AuthState::PendingRedirect);
    }

    #[tokio::test]
    async fn callback_with_matching_state_logs_in_and_fetches() {
        let mut server = mockito::Server::new_async().await;
        let me = server
            .mock("GET", "/me")
            .match_header("authorization", "Bearer AT1")
            .with_status(200)
            .with_body(r#"{"display_name":"listener"}"#)
            .create_async()
            .await;
        let history = server
            .mock("GET", "/me/player/recently-played")
            .match_header("authorization", "Bearer AT1")
            .with_status(200)
            .with_body(r#"{"items":[{"track":{"name":"Some Song","artists":[{"name":"Band"}],"album":{"name":"LP"}}}]}"#)
            .create_async()
            .await;

        let state = app_state(&server.url());
        state.storage.put(AUTH_STATE_KEY, "S1").await.unwrap();
        let app = router(state.clone());

        let page = app.clone().oneshot(get_req("/callback")).await.unwrap();
        assert_eq!(page.status(), StatusCode::OK);
        assert_eq!(state.session.read().await.auth, AuthState::AwaitingCallback);

        let response = app
            .clone()
            .oneshot(post_req(
                "/callback",
                "access_token=AT1&token_type=Bearer&expires_in=3600&state=S1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        for _ in 0..200 {
            if state.session.read().await.in_flight == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let html = body_text(app.oneshot(get_req("/")).await.unwrap()).await;
        assert!(html.contains("Authenticated"));
        assert!(html.contains("Some Song"));
        assert!(html.contains("listener"));
        assert_eq!(state.storage.get(AUTH_STATE_KEY).await.unwrap(), None);
        me.assert_async().await;
        history.assert_async().await;
    }

    #[tokio::test]
    async fn denied_callback_shows_the_error() {
        let state = app_state("http://unused.test");
        state.storage.put(AUTH_STATE_KEY, "S1").await.unwrap();
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(post_req("/callback", "error=access_denied&state=S1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let html = body_text(app.oneshot(get_req("/")).await.unwrap()).await;
        assert!(html.contains("access_denied"));
        assert!(html.contains(r#"href="/login""#));
        assert!(!state.session.read().await.auth.is_logged_in());
    }

    #[tokio::test]
    async fn chart_selection_round_trips() {
        let state = logged_in_state().await;
        let app = router(state.clone());

        let html = body_text(
            app.clone()
                .oneshot(post_req("/chart/select/2", ""))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(html.matches("<path ").count(), 1);

        let html = body_text(
            app.clone()
                .oneshot(post_req("/chart/select/2", ""))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(html.matches("<path ").count(), 5);
        assert_eq!(state.session.read().await.chart.selected(), None);
    }

    #[tokio::test]
    async fn unknown_series_is_not_found() {
        let app = router(logged_in_state().await);
        let response = app.oneshot(post_req("/chart/hover/42", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn resize_clamps_the_width() {
        let state = logged_in_state().await;
        let app = router(state.clone());

        let response = app
            .oneshot(post_req("/chart/resize?width=100", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session.read().await.chart.width(), 320.0);
    }

    #[tokio::test]
    async fn chart_routes_need_a_login() {
        let state = app_state("http://unused.test");
        let app = router(state.clone());

        for uri in [
            "/chart/hover/2",
            "/chart/leave",
            "/chart/select/2",
            "/chart/resize?width=100",
        ] {
            let response = app.clone().oneshot(post_req(uri, "")).await.unwrap();
            assert_eq!(response.status(), StatusCode::CONFLICT, "{uri}");
        }

        let session = state.session.read().await;
        assert_eq!(session.chart.hovered(), None);
        assert_eq!(session.chart.selected(), None);
        assert_eq!(session.chart.width(), 600.0);
    }
}
