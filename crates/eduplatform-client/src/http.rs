//! REST transport for the eduplatform backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eduplatform_core::error::{ApiError, ApiErrorKind, Operation};
use eduplatform_core::model::{
    AuthResponse, Category, DashboardStats, ForumPost, LearningPath, LoginRequest, MentorReply,
    MentorRequest, NewPost, PathPreferences, Quiz, QuizRequest, RegisterRequest, User,
};
use eduplatform_core::traits::{Backend, TokenStore};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// [`Backend`] over HTTP + JSON.
///
/// Reads the bearer token from the shared [`TokenStore`] on every request and
/// clears it when the backend answers 401.
pub struct HttpBackend {
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64, tokens: Arc<dyn TokenStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, operation: Operation, path: &str) -> Result<T, ApiError> {
        self.send(operation, self.client.get(self.url(path))).await
    }

    async fn post<B, T>(&self, operation: Operation, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(operation, self.client.post(self.url(path)).json(body))
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: Operation,
        mut request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        if let Some(token) = self.tokens.load() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|e| {
            let kind = if e.is_timeout() {
                ApiErrorKind::Timeout
            } else {
                ApiErrorKind::Network
            };
            tracing::warn!(%operation, "request failed: {e}");
            ApiError::without_response(operation, kind)
        })?;

        let status = response.status().as_u16();
        if status == 401 {
            tracing::warn!(%operation, "backend rejected credentials, discarding token");
            if let Err(e) = self.tokens.clear() {
                tracing::error!("failed to clear token: {e:#}");
            }
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%operation, status, "error response");
            return Err(ApiError::from_status(operation, status, error_detail(&body)));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(%operation, "failed to parse response: {e}");
            ApiError {
                status: Some(status),
                ..ApiError::without_response(operation, ApiErrorKind::Decode)
            }
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

/// The `detail` string of an error body. Validation errors carry a list
/// there instead, which yields `None`.
fn error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body).ok()?.detail {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }
}

#[derive(Serialize)]
struct GoogleAuthBody<'a> {
    token: &'a str,
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post(Operation::Register, "/api/auth/register", request)
            .await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post(Operation::Login, "/api/auth/login", request).await
    }

    #[instrument(skip_all)]
    async fn google_auth(&self, id_token: &str) -> Result<AuthResponse, ApiError> {
        self.post(
            Operation::GoogleAuth,
            "/api/auth/google",
            &GoogleAuthBody { token: id_token },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn profile(&self) -> Result<User, ApiError> {
        self.get(Operation::Profile, "/api/user/profile").await
    }

    #[instrument(skip(self, preferences), fields(topics = preferences.topics_of_interest.len()))]
    async fn generate_learning_path(
        &self,
        preferences: &PathPreferences,
    ) -> Result<LearningPath, ApiError> {
        self.post(
            Operation::GeneratePath,
            "/api/learning/generate-path",
            preferences,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn learning_paths(&self) -> Result<Vec<LearningPath>, ApiError> {
        self.get(Operation::ListPaths, "/api/learning/paths").await
    }

    #[instrument(skip(self, request), fields(topic = %request.topic, difficulty = %request.difficulty))]
    async fn generate_quiz(&self, request: &QuizRequest) -> Result<Quiz, ApiError> {
        self.post(
            Operation::GenerateQuiz,
            "/api/assessment/generate-quiz",
            request,
        )
        .await
    }

    #[instrument(skip(self, request))]
    async fn chat_with_mentor(&self, request: &MentorRequest) -> Result<MentorReply, ApiError> {
        self.post(Operation::Mentor, "/api/chat/mentor", request).await
    }

    #[instrument(skip(self))]
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(Operation::DashboardStats, "/api/dashboard/stats")
            .await
    }

    #[instrument(skip(self, post), fields(category = %post.category))]
    async fn create_forum_post(&self, post: &NewPost) -> Result<ForumPost, ApiError> {
        self.post(Operation::CreatePost, "/api/forum/posts", post)
            .await
    }

    #[instrument(skip(self))]
    async fn forum_posts(
        &self,
        category: Option<Category>,
        limit: u32,
    ) -> Result<Vec<ForumPost>, ApiError> {
        // Category identifiers are plain lowercase words; no escaping needed.
        let mut path = format!("/api/forum/posts?limit={limit}");
        if let Some(category) = category {
            path.push_str("&category=");
            path.push_str(category.as_str());
        }
        self.get(Operation::ListPosts, &path).await
    }
}
