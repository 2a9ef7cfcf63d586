//! Sign-in form
//!
//! One [`SignInForm`] lives for one mount of the sign-in screen. Mounting
//! fetches a single anti-forgery token from the auth provider; submitting
//! sends the credentials together with that token and turns the provider's
//! answer into either a redirect or an error message.
//!
//! ```text
//! Idle -> TokenLoading -> Ready -> Submitting -> Redirecting
//!                      \                      \-> ErrorDisplayed -> Submitting
//!                       \-> TokenUnavailable
//! ```
//!
//! Results that arrive after [`SignInForm::unmount`] are dropped.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use common::auth::{AuthProvider, SignInRequest, SignInResponse};
use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::navigation::Navigator;

/// Query parameter naming where to go after signing in
pub const CALLBACK_URL_PARAM: &str = "callbackUrl";

/// Where to go after signing in when no callback is given
pub const DEFAULT_CALLBACK_URL: &str = "/";

pub const CSRF_UNAVAILABLE: &str = "CSRF token not available. Please try again.";
pub const AUTH_FAILED: &str = "Authentication failed. Please try again.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

/// Callback URLs must stay on this site: a path, never something a browser
/// could read as another host (`//host`, `/\host`, or one hiding a tab)
fn is_local_path(url: &str) -> bool {
    url.starts_with('/')
        && !url.starts_with("//")
        && !url.contains('\\')
        && !url.chars().any(char::is_control)
}

/// Lifecycle phase of a sign-in form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, token fetch not started yet
    Idle,
    TokenLoading,
    /// The token fetch failed or returned nothing; submitting stays disabled
    /// until the screen is mounted again
    TokenUnavailable,
    Ready,
    Submitting,
    Redirecting,
    ErrorDisplayed,
}

/// Credentials typed into the form
///
/// Moved into [`SignInForm::submit`] and dropped once the attempt is over.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// What a submit attempt ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Signed in; the navigator was sent to this URL
    Redirect(String),
    /// Shown to the user
    Error(String),
    /// Another attempt is still in flight
    Busy,
    /// The form went away before the attempt finished
    Unmounted,
}

/// Snapshot of a form for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInView {
    pub phase: Phase,
    pub csrf_token: String,
    pub error: Option<String>,
    pub loading: bool,
    pub callback_url: String,
}

impl SignInView {
    /// Submitting is disabled while an attempt is in flight and whenever no
    /// token is held
    pub fn submit_disabled(&self) -> bool {
        self.loading || self.csrf_token.is_empty()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading { "Signing in..." } else { "Sign In" }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug)]
struct FormState {
    phase: Phase,
    csrf_token: String,
    error: Option<String>,
    loading: bool,
}

struct Shared {
    auth: Arc<dyn AuthProvider>,
    navigator: Arc<dyn Navigator>,
    /// Provider id credentials are submitted to
    provider: String,
    callback_url: String,
    state: Mutex<FormState>,
    mounted: AtomicBool,
    /// Flips to `true` once the token fetch is over, successful or not
    settled: watch::Sender<bool>,
}

/// A mounted sign-in form
#[derive(Clone)]
pub struct SignInForm {
    shared: Arc<Shared>,
}

impl SignInForm {
    fn build(
        auth: Arc<dyn AuthProvider>,
        navigator: Arc<dyn Navigator>,
        provider: &str,
        state: FormState,
        settled: bool,
    ) -> Self {
        let callback_url = match navigator
            .query_param(CALLBACK_URL_PARAM)
            .filter(|url| !url.is_empty())
        {
            Some(url) if is_local_path(&url) => url,
            Some(url) => {
                warn!("Ignoring off-site callback URL {:?}", url);
                DEFAULT_CALLBACK_URL.to_string()
            }
            None => DEFAULT_CALLBACK_URL.to_string(),
        };
        let (settled, _) = watch::channel(settled);

        Self {
            shared: Arc::new(Shared {
                auth,
                navigator,
                provider: provider.to_string(),
                callback_url,
                state: Mutex::new(state),
                mounted: AtomicBool::new(true),
                settled,
            }),
        }
    }

    /// Mount a new form and start fetching its anti-forgery token
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(auth: Arc<dyn AuthProvider>, navigator: Arc<dyn Navigator>, provider: &str) -> Self {
        let form = Self::build(
            auth,
            navigator,
            provider,
            FormState {
                phase: Phase::TokenLoading,
                csrf_token: String::new(),
                error: None,
                loading: false,
            },
            false,
        );

        let task = form.clone();
        tokio::spawn(async move { task.load_token().await });

        form
    }

    /// Resume a form whose token was fetched when it was first mounted
    ///
    /// No token is fetched; a missing or empty `csrf_token` leaves the form
    /// without one.
    pub fn with_token(
        auth: Arc<dyn AuthProvider>,
        navigator: Arc<dyn Navigator>,
        provider: &str,
        csrf_token: Option<String>,
    ) -> Self {
        let csrf_token = csrf_token.unwrap_or_default();
        let phase = if csrf_token.is_empty() {
            Phase::TokenUnavailable
        } else {
            Phase::Ready
        };

        Self::build(
            auth,
            navigator,
            provider,
            FormState {
                phase,
                csrf_token,
                error: None,
                loading: false,
            },
            true,
        )
    }

    fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    async fn load_token(&self) {
        let result = self.shared.auth.csrf_token().await;

        {
            let mut state = self.shared.state.lock().await;
            if !self.is_mounted() {
                debug!("Dropping anti-forgery token for an unmounted form");
            } else {
                match result {
                    Ok(Some(token)) => {
                        state.csrf_token = token;
                        if state.phase == Phase::TokenLoading {
                            state.phase = Phase::Ready;
                        }
                    }
                    Ok(None) => {
                        warn!("Auth provider returned no CSRF token");
                        if state.phase == Phase::TokenLoading {
                            state.phase = Phase::TokenUnavailable;
                        }
                    }
                    Err(e) => {
                        error!("Failed to fetch CSRF token: {}", e);
                        if state.phase == Phase::TokenLoading {
                            state.phase = Phase::TokenUnavailable;
                        }
                    }
                }
            }
        }

        self.shared.settled.send_replace(true);
    }

    /// Wait until the token fetch started by [`SignInForm::mount`] is over
    pub async fn token_settled(&self) {
        let mut settled = self.shared.settled.subscribe();
        // The sender lives in `self`, so the channel cannot close under us
        let _ = settled.wait_for(|settled| *settled).await;
    }

    /// Submit credentials to the auth provider
    ///
    /// On success the navigator is sent to the callback URL and asked to
    /// refresh. Every other ending is reported as an error message.
    pub async fn submit(&self, credentials: Credentials) -> SubmitOutcome {
        let csrf_token = {
            let mut state = self.shared.state.lock().await;
            if !self.is_mounted() {
                return SubmitOutcome::Unmounted;
            }
            if state.loading {
                return SubmitOutcome::Busy;
            }

            state.error = None;
            if state.csrf_token.is_empty() {
                state.phase = Phase::ErrorDisplayed;
                state.error = Some(CSRF_UNAVAILABLE.to_string());
                return SubmitOutcome::Error(CSRF_UNAVAILABLE.to_string());
            }

            state.loading = true;
            state.phase = Phase::Submitting;
            state.csrf_token.clone()
        };

        info!("Sign-in attempt for {}", credentials.email);
        let request = SignInRequest {
            email: credentials.email,
            password: credentials.password,
            csrf_token,
            callback_url: self.shared.callback_url.clone(),
        };
        let result = self.shared.auth.sign_in(&self.shared.provider, request).await;

        let mut state = self.shared.state.lock().await;
        if !self.is_mounted() {
            debug!("Dropping sign-in result for an unmounted form");
            return SubmitOutcome::Unmounted;
        }
        state.loading = false;

        let message = match result {
            Ok(SignInResponse {
                error: Some(error), ..
            }) => error,
            Ok(SignInResponse { ok: true, .. }) => {
                state.phase = Phase::Redirecting;
                drop(state);

                info!("Signed in, redirecting to {}", self.shared.callback_url);
                self.shared.navigator.push(&self.shared.callback_url);
                self.shared.navigator.refresh();
                return SubmitOutcome::Redirect(self.shared.callback_url.clone());
            }
            Ok(_) => AUTH_FAILED.to_string(),
            Err(e) => {
                error!("Sign in error: {}", e);
                UNEXPECTED_ERROR.to_string()
            }
        };

        state.phase = Phase::ErrorDisplayed;
        state.error = Some(message.clone());
        SubmitOutcome::Error(message)
    }

    /// Show an error without contacting the provider
    pub async fn reject(&self, message: &str) {
        let mut state = self.shared.state.lock().await;
        if self.is_mounted() {
            state.phase = Phase::ErrorDisplayed;
            state.error = Some(message.to_string());
        }
    }

    pub async fn view(&self) -> SignInView {
        let state = self.shared.state.lock().await;
        SignInView {
            phase: state.phase,
            csrf_token: state.csrf_token.clone(),
            error: state.error.clone(),
            loading: state.loading,
            callback_url: self.shared.callback_url.clone(),
        }
    }

    /// Tear the form down; in-flight results are dropped when they arrive
    pub fn unmount(&self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
    }
}
