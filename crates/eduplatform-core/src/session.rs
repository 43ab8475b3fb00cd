//! Session and authentication controller.
//!
//! A [`Session`] is created once at startup and handed to every screen
//! controller. It owns the authentication state, the token store, and the
//! backend handle that controllers borrow.

use std::fmt;
use std::sync::Arc;

use crate::error::ApiError;
use crate::model::{AuthResponse, LoginRequest, ProfileEdit, RegisterRequest, User};
use crate::traits::{Backend, TokenStore};

/// Authentication state of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Startup, before the stored token has been checked.
    Loading,
    SignedOut,
    SignedIn(User),
}

/// Screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Learning,
    Assessment,
    Mentor,
    Forum,
    Profile,
}

impl Route {
    /// Map a location path to a route. Unknown paths yield `None`.
    pub fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" | "/dashboard" => Some(Route::Dashboard),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/learning" => Some(Route::Learning),
            "/assessment" => Some(Route::Assessment),
            "/mentor" => Some(Route::Mentor),
            "/forum" => Some(Route::Forum),
            "/profile" => Some(Route::Profile),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Learning => "/learning",
            Route::Assessment => "/assessment",
            Route::Mentor => "/mentor",
            Route::Forum => "/forum",
            Route::Profile => "/profile",
        }
    }

    /// Routes reachable without signing in.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub struct Session {
    backend: Arc<dyn Backend>,
    tokens: Arc<dyn TokenStore>,
    state: AuthState,
}

impl Session {
    /// A session in the `Loading` state. Call [`Session::init`] next.
    pub fn new(backend: Arc<dyn Backend>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            backend,
            tokens,
            state: AuthState::Loading,
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::SignedIn(_)) && self.tokens.load().is_some()
    }

    /// Check the stored token against the backend.
    ///
    /// Any failure to fetch the profile discards the token.
    pub async fn init(&mut self) -> &AuthState {
        if self.tokens.load().is_none() {
            tracing::debug!("no stored token");
            self.state = AuthState::SignedOut;
            return &self.state;
        }

        match self.backend.profile().await {
            Ok(user) => {
                tracing::info!(user = %user.email, "session restored");
                self.state = AuthState::SignedIn(user);
            }
            Err(e) => {
                tracing::warn!("stored token rejected: {e}");
                self.discard_token();
                self.state = AuthState::SignedOut;
            }
        }
        &self.state
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response = self.backend.register(request).await?;
        Ok(self.sign_in(response))
    }

    pub async fn login(&mut self, request: &LoginRequest) -> Result<User, ApiError> {
        let response = self.backend.login(request).await?;
        Ok(self.sign_in(response))
    }

    pub async fn login_with_google(&mut self, id_token: &str) -> Result<User, ApiError> {
        let response = self.backend.google_auth(id_token).await?;
        Ok(self.sign_in(response))
    }

    /// Forget the token and user. No backend call is made.
    pub fn logout(&mut self) {
        self.discard_token();
        self.state = AuthState::SignedOut;
        tracing::info!("logged out");
    }

    /// Apply profile edits locally. The backend is not updated.
    pub fn update_profile(&mut self, edit: ProfileEdit) -> Option<&User> {
        let AuthState::SignedIn(user) = &mut self.state else {
            return None;
        };
        if let Some(name) = edit.full_name {
            user.full_name = name;
        }
        if let Some(email) = edit.email {
            user.email = email;
        }
        if let Some(preferences) = edit.learning_preferences {
            user.learning_preferences = preferences;
        }
        Some(&*user)
    }

    /// The screen to show for `requested`.
    ///
    /// A token that disappeared since the last render (a 401 cleared it)
    /// signs the session out first.
    pub fn resolve(&mut self, requested: Route) -> Route {
        if matches!(self.state, AuthState::SignedIn(_)) && self.tokens.load().is_none() {
            tracing::info!("token gone, returning to login");
            self.state = AuthState::SignedOut;
        }

        match self.state {
            AuthState::SignedIn(_) if requested.is_public() => Route::Dashboard,
            AuthState::SignedIn(_) => requested,
            _ if requested.is_public() => requested,
            _ => Route::Login,
        }
    }

    /// Like [`Session::resolve`] for a raw path; unknown paths fall back to
    /// the dashboard (or login when signed out).
    pub fn resolve_path(&mut self, path: &str) -> Route {
        let requested = Route::from_path(path).unwrap_or(Route::Dashboard);
        self.resolve(requested)
    }

    fn sign_in(&mut self, response: AuthResponse) -> User {
        if let Err(e) = self.tokens.save(&response.access_token) {
            tracing::error!("failed to persist token: {e:#}");
        }
        tracing::info!(user = %response.user.email, "signed in");
        self.state = AuthState::SignedIn(response.user.clone());
        response.user
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::error!("failed to clear token: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::MockBackend;
    use crate::traits::MemoryTokenStore;

    fn setup(token: Option<&str>) -> (Arc<MockBackend>, Arc<MemoryTokenStore>, Session) {
        let tokens = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let backend = Arc::new(MockBackend::new().with_token_store(tokens.clone()));
        let session = Session::new(backend.clone(), tokens.clone());
        (backend, tokens, session)
    }

    #[tokio::test]
    async fn init_without_token_signs_out_without_calling_backend() {
        let (backend, _, mut session) = setup(None);
        assert_eq!(session.state(), &AuthState::Loading);
        assert_eq!(session.init().await, &AuthState::SignedOut);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn init_with_valid_token_restores_user() {
        let (_, _, mut session) = setup(Some("stored"));
        session.init().await;
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().full_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn init_restores_the_backend_profile() {
        let tokens = Arc::new(MemoryTokenStore::with_token("stored"));
        let backend = Arc::new(MockBackend::new().with_user(crate::mock::user("Grace Hopper")));
        let mut session = Session::new(backend, tokens);
        session.init().await;
        assert_eq!(session.user().unwrap().full_name, "Grace Hopper");
        assert_eq!(session.resolve(Route::Login), Route::Dashboard);
    }

    #[tokio::test]
    async fn init_with_rejected_token_clears_it() {
        let (backend, tokens, mut session) = setup(Some("stale"));
        backend.fail(Operation::Profile, 500, None);
        assert_eq!(session.init().await, &AuthState::SignedOut);
        assert!(tokens.load().is_none());
    }

    #[tokio::test]
    async fn login_persists_token() {
        let (backend, tokens, mut session) = setup(None);
        session.init().await;
        let user = session
            .login(&LoginRequest {
                email: "ada@example.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(tokens.load().as_deref(), Some(backend.access_token()));
        assert_eq!(session.resolve(Route::Login), Route::Dashboard);
    }

    #[tokio::test]
    async fn failed_login_keeps_state() {
        let (_, tokens, mut session) = setup(None);
        session.init().await;
        let err = session
            .login(&LoginRequest {
                email: "nobody@example.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Incorrect email or password");
        assert_eq!(session.state(), &AuthState::SignedOut);
        assert!(tokens.load().is_none());
    }

    #[tokio::test]
    async fn register_and_google_sign_in() {
        let (_, _, mut session) = setup(None);
        let user = session
            .register(&RegisterRequest {
                email: "grace@example.com".into(),
                password: "pw".into(),
                full_name: "Grace Hopper".into(),
                learning_preferences: None,
            })
            .await
            .unwrap();
        assert_eq!(user.full_name, "Grace Hopper");

        session.logout();
        assert!(!session.is_authenticated());

        session.login_with_google("google-id-token").await.unwrap();
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_response_sends_next_render_to_login() {
        let (backend, tokens, mut session) = setup(Some("stored"));
        session.init().await;
        assert_eq!(session.resolve(Route::Forum), Route::Forum);

        backend.fail(Operation::DashboardStats, 401, None);
        let err = session.backend().dashboard_stats().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(tokens.load().is_none());

        assert_eq!(session.resolve(Route::Forum), Route::Login);
        assert_eq!(session.state(), &AuthState::SignedOut);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let (_, tokens, mut session) = setup(Some("stored"));
        session.init().await;
        session.logout();
        assert!(tokens.load().is_none());
        assert!(session.user().is_none());
        assert_eq!(session.resolve(Route::Profile), Route::Login);
        assert_eq!(session.resolve(Route::Register), Route::Register);
    }

    #[tokio::test]
    async fn profile_edits_are_local() {
        let (backend, _, mut session) = setup(Some("stored"));
        session.init().await;
        let calls_before = backend.calls().len();

        let user = session
            .update_profile(ProfileEdit {
                full_name: Some("Ada King".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(user.full_name, "Ada King");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(backend.calls().len(), calls_before);
    }

    #[test]
    fn path_mapping() {
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/forum/"), Some(Route::Forum));
        assert_eq!(Route::from_path("/nowhere"), None);
        assert_eq!(Route::Mentor.to_string(), "/mentor");
    }

    #[tokio::test]
    async fn unknown_paths_fall_back() {
        let (_, _, mut session) = setup(None);
        session.init().await;
        assert_eq!(session.resolve_path("/nowhere"), Route::Login);

        session.login_with_google("t").await.unwrap();
        assert_eq!(session.resolve_path("/nowhere"), Route::Dashboard);
    }
}
