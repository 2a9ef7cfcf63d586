//! Integration tests for the HTTP collaborator clients
//!
//! Each test starts a stub server on a random local port that plays the auth
//! provider, the catalog or an image host.

use std::collections::HashMap;

use axum::{
    Form, Json, Router,
    extract::Path,
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    response::IntoResponse,
    routing::{get, post},
};
use common::{
    auth::{AuthConnector, AuthProvider, HttpAuthConnector, SignInRequest},
    catalog::{CatalogSource, HttpCatalog},
    error::ImageError,
    images::{HttpImageLoader, ImageLoader},
};
use secrecy::SecretString;
use serde_json::json;

const CSRF_COOKIE: &str = "next-auth.csrf-token=tok%7Chash";

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn csrf() -> impl IntoResponse {
    (
        [(SET_COOKIE, format!("{}; Path=/; HttpOnly; SameSite=Lax", CSRF_COOKIE))],
        Json(json!({ "csrfToken": "tok" })),
    )
}

async fn callback(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    let cookies = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !cookies.contains(CSRF_COOKIE) || form.get("csrfToken").map(String::as_str) != Some("tok") {
        return Json(json!({ "url": "http://localhost:3000/api/auth/signin?csrf=true" }))
            .into_response();
    }

    if form.get("json").map(String::as_str) != Some("true") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    if form.get("email").map(String::as_str) == Some("ada@example.com")
        && form.get("password").map(String::as_str) == Some("correct horse")
    {
        (
            [(SET_COOKIE, "next-auth.session-token=session; Path=/; HttpOnly".to_string())],
            Json(json!({ "url": form.get("callbackUrl").cloned().unwrap_or_default() })),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "url": "http://localhost:3000/api/auth/error?error=CredentialsSignin" })),
        )
            .into_response()
    }
}

fn auth_router() -> Router {
    Router::new()
        .route("/api/auth/csrf", get(csrf))
        .route("/api/auth/callback/:provider", post(callback))
}

fn request(password: &str, csrf_token: &str) -> SignInRequest {
    SignInRequest {
        email: "ada@example.com".to_string(),
        password: SecretString::new(password.to_string()),
        csrf_token: csrf_token.to_string(),
        callback_url: "http://localhost:3000/movies".to_string(),
    }
}

#[tokio::test]
async fn test_sign_in_round_trip() {
    let base = spawn_stub(auth_router()).await;
    let connector = HttpAuthConnector::new(reqwest::Client::new(), &base).unwrap();
    let provider = connector.connect(None);

    let token = provider.csrf_token().await.unwrap();
    assert_eq!(token.as_deref(), Some("tok"));

    let response = provider
        .sign_in("credentials", request("correct horse", "tok"))
        .await
        .unwrap();

    assert!(response.ok);
    assert_eq!(response.error, None);
    assert_eq!(response.url.as_deref(), Some("http://localhost:3000/movies"));

    let relayed = provider.relay_cookies();
    assert_eq!(relayed.len(), 2);
    assert!(relayed[1].starts_with("next-auth.session-token=session"));
}

#[tokio::test]
async fn test_sign_in_rejected_with_error_message() {
    let base = spawn_stub(auth_router()).await;
    let connector = HttpAuthConnector::new(reqwest::Client::new(), &base).unwrap();
    let provider = connector.connect(None);

    provider.csrf_token().await.unwrap();
    let response = provider
        .sign_in("credentials", request("wrong", "tok"))
        .await
        .unwrap();

    assert!(!response.ok);
    assert_eq!(response.error.as_deref(), Some("CredentialsSignin"));
    assert_eq!(response.status, Some(401));
    assert_eq!(response.url, None);
}

#[tokio::test]
async fn test_browser_cookies_are_forwarded() {
    let base = spawn_stub(auth_router()).await;
    let connector = HttpAuthConnector::new(reqwest::Client::new(), &base).unwrap();

    // A fresh provider that never fetched a token still carries the browser's
    // anti-forgery cookie
    let provider = connector.connect(Some(CSRF_COOKIE));
    let response = provider
        .sign_in("credentials", request("correct horse", "tok"))
        .await
        .unwrap();

    assert!(response.ok);
    assert_eq!(response.error, None);
}

#[tokio::test]
async fn test_csrf_failure_status() {
    let router = Router::new().route(
        "/api/auth/csrf",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = spawn_stub(router).await;
    let provider = HttpAuthConnector::new(reqwest::Client::new(), &base)
        .unwrap()
        .connect(None);

    assert!(provider.csrf_token().await.is_err());
}

#[tokio::test]
async fn test_catalog_client() {
    let router = Router::new()
        .route(
            "/api/movies",
            get(|| async {
                Json(json!([
                    { "_id": "1", "title": "Arrival", "posterUrl": "//static.hdrezka.ac/i/a.jpg",
                      "type": "movie", "status": "released", "rating": 7.9 },
                    { "_id": "2", "title": "Dune", "posterUrl": "", "type": "movie",
                      "status": "announced" }
                ]))
            }),
        )
        .route(
            "/api/movies/:id",
            get(|Path(id): Path<String>| async move {
                if id == "1" {
                    Json(json!({ "_id": "1", "title": "Arrival", "type": "movie", "status": "released" }))
                        .into_response()
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }),
        );
    let base = spawn_stub(router).await;
    let catalog = HttpCatalog::new(reqwest::Client::new(), &base).unwrap();

    let movies = catalog.list_movies().await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].rating, Some(7.9));
    assert_eq!(movies[1].rating, None);

    assert_eq!(catalog.get_movie("1").await.unwrap().unwrap().title, "Arrival");
    assert!(catalog.get_movie("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_image_loader() {
    let router = Router::new()
        .route(
            "/poster.jpg",
            get(|| async { ([(CONTENT_TYPE, "image/jpeg")], vec![0xff_u8, 0xd8, 0xff]) }),
        )
        .route(
            "/page.html",
            get(|| async { ([(CONTENT_TYPE, "text/html")], "<html></html>") }),
        );
    let base = spawn_stub(router).await;
    let loader = HttpImageLoader::new(reqwest::Client::new());

    let image = loader.load(&format!("{}/poster.jpg", base)).await.unwrap();
    assert_eq!(image.content_type, "image/jpeg");
    assert_eq!(image.bytes, vec![0xff, 0xd8, 0xff]);

    assert!(matches!(
        loader.load(&format!("{}/page.html", base)).await,
        Err(ImageError::NotAnImage(Some(_)))
    ));
    assert!(matches!(
        loader.load(&format!("{}/missing.jpg", base)).await,
        Err(ImageError::Status(status)) if status == StatusCode::NOT_FOUND
    ));
}
