//! Web front-end routes

use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use common::images::is_allowed;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    error::{WebError, WebResult},
    forms::SignInFormData,
    movie_card::MovieCard,
    navigation::ServerNavigator,
    poster::{PosterBody, PosterImage, resolve_poster},
    signin::{Phase, SignInForm},
    state::AppState,
    templates::{CatalogTemplate, MovieTemplate, SignInTemplate, render},
};

/// Create the router for the web front-end
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(catalog_page))
        .route("/movies/:id", get(movie_page))
        .route("/auth/signin", get(signin_page).post(signin_submit))
        .route("/_image", get(poster_image))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "web"
    }))
}

/// Catalog page with one card per movie
pub async fn catalog_page(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let movies = state.catalog.list_movies().await?;
    let cards = movies.iter().map(MovieCard::new).collect();

    render(&CatalogTemplate { cards })
}

/// Detail page of a single movie
pub async fn movie_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let movie = state
        .catalog
        .get_movie(&id)
        .await?
        .ok_or(WebError::NotFound)?;

    render(&MovieTemplate {
        card: MovieCard::new(&movie),
    })
}

/// Sign-in screen; every visit mounts a fresh form with its own token
pub async fn signin_page(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> WebResult<Response> {
    let provider = state.auth.connect(browser_cookies(&headers));
    let navigator = Arc::new(ServerNavigator::new(query));
    let form = SignInForm::mount(provider.clone(), navigator, &state.auth_provider_id);

    form.token_settled().await;
    let view = form.view().await;
    form.unmount();

    let page = render(&SignInTemplate { view })?;
    Ok(relay_cookies(provider.relay_cookies(), page.into_response()))
}

/// Sign-in form submission
pub async fn signin_submit(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Form(data): Form<SignInFormData>,
) -> WebResult<Response> {
    let provider = state.auth.connect(browser_cookies(&headers));
    let navigator = Arc::new(ServerNavigator::new(query));

    let validation = data.validate();
    let (credentials, csrf_token) = data.into_parts();
    let has_token = csrf_token.as_deref().is_some_and(|token| !token.is_empty());
    let form = SignInForm::with_token(
        provider.clone(),
        navigator.clone(),
        &state.auth_provider_id,
        csrf_token,
    );

    // A missing token is reported before anything about the fields
    match validation {
        Err(message) if has_token => {
            warn!("Rejected sign-in form: {}", message);
            form.reject(&message).await;
        }
        _ => {
            form.submit(credentials).await;
        }
    }

    let view = form.view().await;
    form.unmount();

    let response = match navigator.location() {
        Some(location) if view.phase == Phase::Redirecting => {
            see_other(&location, navigator.refresh_requested())
        }
        _ => render(&SignInTemplate { view })?.into_response(),
    };

    Ok(relay_cookies(provider.relay_cookies(), response))
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub url: String,
}

/// Poster proxy; answers the placeholder when the poster cannot be loaded
///
/// Hosts outside the remote patterns are never fetched; they get the
/// placeholder like any other failed load.
pub async fn poster_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> impl IntoResponse {
    let body = if is_allowed(&state.remote_patterns, &query.url) {
        let mut poster = PosterImage::new(&query.url);
        resolve_poster(state.images.as_ref(), &mut poster).await
    } else {
        warn!("Refusing to load image from {}", query.url);
        PosterBody::placeholder()
    };
    let cache_control = if body.fallback {
        "no-store"
    } else {
        "public, max-age=86400"
    };

    (
        [
            (CONTENT_TYPE, body.content_type),
            (CACHE_CONTROL, cache_control.to_string()),
        ],
        body.bytes,
    )
}

/// Fallback for unknown paths
pub async fn not_found() -> WebError {
    WebError::NotFound
}

fn browser_cookies(headers: &HeaderMap) -> Option<&str> {
    headers.get(COOKIE).and_then(|value| value.to_str().ok())
}

/// `303 See Other` to `location`; falls back to `/` when it is not a valid
/// header value
fn see_other(location: &str, refresh: bool) -> Response {
    let location = HeaderValue::from_str(location).unwrap_or_else(|_| {
        warn!("Invalid redirect location {:?}, using /", location);
        HeaderValue::from_static("/")
    });
    info!("Redirecting to {:?}", location);

    let mut response = StatusCode::SEE_OTHER.into_response();
    response.headers_mut().insert(LOCATION, location);
    if refresh {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    response
}

/// Pass the provider's `Set-Cookie` headers on to the browser
fn relay_cookies(cookies: Vec<String>, mut response: Response) -> Response {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(_) => warn!("Dropping unrelayable cookie from auth provider"),
        }
    }
    response
}
