//! Credentials auth provider capability
//!
//! The sign-in flow never talks to the session layer directly: it is handed an
//! [`AuthProvider`] that can issue anti-forgery tokens and check credentials.
//! [`HttpAuthProvider`] implements it against the credentials-provider REST
//! contract:
//!
//! - `GET {base}/api/auth/csrf` answers `{"csrfToken": "..."}`
//! - `POST {base}/api/auth/callback/{provider}` takes the credentials as a form
//!   and answers `{"url": "..."}`; an `error` query parameter on that URL is
//!   the rejection message

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, Url,
    header::{COOKIE, SET_COOKIE},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AuthProviderError, AuthResult};

/// Credentials submitted to a provider
///
/// The provider is always asked to answer with a result instead of
/// redirecting the browser itself.
#[derive(Debug)]
pub struct SignInRequest {
    pub email: String,
    pub password: SecretString,
    pub csrf_token: String,
    pub callback_url: String,
}

/// Result reported by the provider for a sign-in attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInResponse {
    /// The provider accepted the request
    pub ok: bool,
    /// Rejection message, shown to the user as-is
    pub error: Option<String>,
    /// HTTP status of the provider's answer, when there was one
    pub status: Option<u16>,
    /// Where the provider would have redirected
    pub url: Option<String>,
}

/// Capability to issue anti-forgery tokens and check credentials
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Fetch a fresh anti-forgery token; `None` when the provider has none
    async fn csrf_token(&self) -> AuthResult<Option<String>>;

    /// Submit credentials to the named provider
    async fn sign_in(&self, provider: &str, request: SignInRequest) -> AuthResult<SignInResponse>;

    /// Cookies the provider asked the browser to store, as raw `Set-Cookie`
    /// values
    fn relay_cookies(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Opens an [`AuthProvider`] on behalf of one browser
pub trait AuthConnector: Send + Sync {
    /// `browser_cookies` is the browser's `Cookie` header, forwarded as-is
    fn connect(&self, browser_cookies: Option<&str>) -> Arc<dyn AuthProvider>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsrfTokenResponse {
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallbackResponse {
    url: Option<String>,
}

/// [`AuthProvider`] speaking HTTP to the credentials provider
pub struct HttpAuthProvider {
    client: Client,
    base_url: Url,
    browser_cookies: Option<String>,
    /// `Set-Cookie` values received from the provider, in arrival order
    received: Mutex<Vec<String>>,
}

impl HttpAuthProvider {
    /// Create a new provider client rooted at `base_url`
    pub fn new(client: Client, base_url: &str) -> AuthResult<Self> {
        let base_url = crate::parse_base_url(base_url)
            .ok_or_else(|| AuthProviderError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            base_url,
            browser_cookies: None,
            received: Mutex::new(Vec::new()),
        })
    }

    /// Forward the browser's cookies with every request
    pub fn with_browser_cookies(mut self, cookies: Option<&str>) -> Self {
        self.browser_cookies = cookies.map(str::to_owned);
        self
    }

    /// `Cookie` header for the next request: the browser's cookies followed by
    /// whatever the provider has set since
    fn cookie_header(&self) -> Option<String> {
        let received = self.received.lock().ok()?;
        let mut pairs: Vec<&str> = self.browser_cookies.iter().map(String::as_str).collect();
        pairs.extend(
            received
                .iter()
                .filter_map(|cookie| cookie.split(';').next())
                .map(str::trim)
                .filter(|pair| !pair.is_empty()),
        );

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    fn with_cookies(&self, request: RequestBuilder) -> RequestBuilder {
        match self.cookie_header() {
            Some(cookies) => request.header(COOKIE, cookies),
            None => request,
        }
    }

    fn collect_cookies(&self, response: &Response) {
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned);

        if let Ok(mut received) = self.received.lock() {
            received.extend(cookies);
        }
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn csrf_token(&self) -> AuthResult<Option<String>> {
        let url = crate::endpoint(&self.base_url, &["api", "auth", "csrf"]);
        debug!("Fetching anti-forgery token from {}", url);

        let response = self.with_cookies(self.client.get(url)).send().await?;
        self.collect_cookies(&response);

        let status = response.status();
        if !status.is_success() {
            return Err(AuthProviderError::Status(status));
        }

        let body: CsrfTokenResponse = response.json().await?;
        Ok(body.csrf_token.filter(|token| !token.is_empty()))
    }

    async fn sign_in(&self, provider: &str, request: SignInRequest) -> AuthResult<SignInResponse> {
        let url = crate::endpoint(&self.base_url, &["api", "auth", "callback", provider]);
        info!("Submitting credentials to provider {}", provider);

        let form = [
            ("email", request.email.as_str()),
            ("password", request.password.expose_secret().as_str()),
            ("csrfToken", request.csrf_token.as_str()),
            ("callbackUrl", request.callback_url.as_str()),
            ("json", "true"),
        ];

        let response = self
            .with_cookies(self.client.post(url))
            .header("X-Auth-Return-Redirect", "1")
            .form(&form)
            .send()
            .await?;
        self.collect_cookies(&response);

        let status = response.status();
        let body: CallbackResponse = response.json().await?;
        let error = body.url.as_deref().and_then(error_from_url);

        Ok(SignInResponse {
            ok: status.is_success(),
            url: if error.is_some() { None } else { body.url },
            error,
            status: Some(status.as_u16()),
        })
    }

    fn relay_cookies(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }
}

/// Extract the `error` query parameter the provider puts on its answer URL
fn error_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "error")
        .map(|(_, value)| value.into_owned())
        .filter(|error| !error.is_empty())
}

/// [`AuthConnector`] handing out [`HttpAuthProvider`]s that share one client
#[derive(Clone)]
pub struct HttpAuthConnector {
    client: Client,
    base_url: Url,
}

impl HttpAuthConnector {
    /// Create a new connector rooted at `base_url`
    pub fn new(client: Client, base_url: &str) -> AuthResult<Self> {
        let base_url = crate::parse_base_url(base_url)
            .ok_or_else(|| AuthProviderError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self { client, base_url })
    }
}

impl AuthConnector for HttpAuthConnector {
    fn connect(&self, browser_cookies: Option<&str>) -> Arc<dyn AuthProvider> {
        let provider = HttpAuthProvider {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            browser_cookies: None,
            received: Mutex::new(Vec::new()),
        };

        Arc::new(provider.with_browser_cookies(browser_cookies))
    }
}
